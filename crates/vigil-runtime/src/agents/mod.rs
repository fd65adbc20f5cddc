//! Review agents for the Inspector and Challenger roles.
//!
//! The runtime never talks to a model directly; callers plug in their own
//! agent runner through [`ReviewAgent`].

mod traits;

pub use traits::{AgentError, ReviewAgent, ReviewRole};
