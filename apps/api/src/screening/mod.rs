// Resume screening: text normalization, model verdicts, the acceptance policy,
// vacancy profile generation and document extraction for uploads.

pub mod extraction;
pub mod handlers;
pub mod normalizer;
pub mod pipeline;
pub mod policy;
pub mod profile;
pub mod prompts;
pub mod verdict;
