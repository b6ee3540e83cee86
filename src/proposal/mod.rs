//! Candidate proposal
//!
//! The engine only needs "give me the next normalized point"; the ranking
//! model behind it is pluggable through [`CandidateProposer`].

mod gaussian;
mod pareto;
mod traits;

pub use gaussian::GaussianProposer;
pub use pareto::pareto_front_indices;
pub use traits::{CandidateProposer, NormalizedObservation, ProposalContext};
