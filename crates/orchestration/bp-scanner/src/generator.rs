//! Candidate generation.
//!
//! Two kinds of source feed the candidate queue:
//! - a static wordlist, one candidate per non-blank line
//! - domain mutation, which combines a domain, its host label, a mutation
//!   wordlist and optional keywords through a fixed set of separators
//!
//! Both are lazy iterators, so memory use does not grow with the number of
//! combinations. Nothing is de-duplicated.

use bp_error::ConfigError;
use bp_types::Candidate;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::stats::RunStats;
use crate::wordlist::Wordlist;

/// Separators placed between mutation parts, in emission order.
pub const SEPARATORS: [&str; 4] = [".", "-", "_", ""];

/// Domain, host label and keywords for mutation mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationPlan {
    domain: String,
    host: String,
    keywords: Vec<String>,
}

impl MutationPlan {
    /// Create a plan for `domain`.
    ///
    /// The host label is everything before the first `.`. Blank keywords are dropped.
    pub fn new(domain: impl Into<String>, keywords: Vec<String>) -> Result<Self, ConfigError> {
        let domain = domain.into().trim().to_string();
        if domain.is_empty() {
            return Err(ConfigError::Invalid("domain must not be empty".to_string()));
        }

        let host = domain.split('.').next().unwrap_or_default().to_string();
        let keywords = keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        Ok(Self {
            domain,
            host,
            keywords,
        })
    }

    /// The full domain.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The leading label of the domain.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The keyword set.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Number of candidates each mutation word expands to.
    pub fn per_word(&self) -> usize {
        SEPARATORS.len() * (4 + 12 * self.keywords.len())
    }

    /// Push every mutation of `word` joined with `sep` onto `out`.
    fn expand(&self, word: &str, sep: &str, out: &mut VecDeque<String>) {
        let (h, d) = (self.host.as_str(), self.domain.as_str());

        out.push_back(format!("{h}{sep}{word}"));
        out.push_back(format!("{word}{sep}{h}"));
        out.push_back(format!("{d}{sep}{word}"));
        out.push_back(format!("{word}{sep}{d}"));

        for k in &self.keywords {
            for base in [h, d] {
                out.push_back(format!("{base}{sep}{word}{sep}{k}"));
                out.push_back(format!("{base}{sep}{k}{sep}{word}"));
                out.push_back(format!("{word}{sep}{base}{sep}{k}"));
                out.push_back(format!("{word}{sep}{k}{sep}{base}"));
                out.push_back(format!("{k}{sep}{base}{sep}{word}"));
                out.push_back(format!("{k}{sep}{word}{sep}{base}"));
            }
        }
    }

    /// Lazily expand `words` into candidate names.
    ///
    /// The host label and the domain are emitted first, once each.
    pub fn mutations<I>(self, words: I) -> Mutations<I>
    where
        I: Iterator<Item = String>,
    {
        let mut pending = VecDeque::with_capacity(self.per_word());
        pending.push_back(self.host.clone());
        pending.push_back(self.domain.clone());

        Mutations {
            plan: self,
            words,
            pending,
        }
    }
}

/// Iterator returned by [`MutationPlan::mutations`].
#[derive(Debug)]
pub struct Mutations<I> {
    plan: MutationPlan,
    words: I,
    pending: VecDeque<String>,
}

impl<I> Iterator for Mutations<I>
where
    I: Iterator<Item = String>,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(name) = self.pending.pop_front() {
                return Some(name);
            }

            let word = self.words.next()?;
            for sep in SEPARATORS {
                self.plan.expand(&word, sep, &mut self.pending);
            }
        }
    }
}

/// A configured source of candidates.
#[derive(Debug)]
pub enum CandidateSource {
    /// One candidate per wordlist line
    Wordlist(Wordlist),

    /// Domain mutation over a mutation wordlist
    Mutations {
        /// Domain, host label and keywords
        plan: MutationPlan,
        /// Mutation words
        words: Wordlist,
    },
}

impl CandidateSource {
    /// Short name for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Wordlist(_) => "wordlist",
            Self::Mutations { .. } => "mutations",
        }
    }

    /// Turn the source into a lazy stream of candidates.
    pub fn into_candidates(self) -> Box<dyn Iterator<Item = Candidate> + Send> {
        match self {
            Self::Wordlist(words) => Box::new(words.filter_map(Candidate::new)),
            Self::Mutations { plan, words } => {
                Box::new(plan.mutations(words).filter_map(Candidate::new))
            }
        }
    }
}

/// Push every candidate of `source` into the candidate queue.
///
/// Blocks while the queue is full, which throttles generation to probing
/// throughput. Stops early if the queue closes or the run is cancelled.
/// Returns the number of candidates pushed.
pub(crate) fn produce(
    source: CandidateSource,
    tx: async_channel::Sender<Candidate>,
    stats: Arc<RunStats>,
    cancel: CancellationToken,
) -> u64 {
    let label = source.label();
    info!(source = label, "Generating candidates");

    let mut pushed = 0;
    for candidate in source.into_candidates() {
        if cancel.is_cancelled() {
            debug!(source = label, "Generation cancelled");
            break;
        }
        if tx.send_blocking(candidate).is_err() {
            debug!(source = label, "Candidate queue closed");
            break;
        }
        stats.record_candidate();
        pushed += 1;
    }

    debug!(source = label, pushed, "Source exhausted");
    pushed
}
