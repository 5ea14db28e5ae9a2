// Skill-gap engine: normalization, catalog matching, semantic equivalence,
// gap scoring and role prediction. HTTP wiring lives in `handlers`.

pub mod catalog;
pub mod extraction;
pub mod gap;
pub mod handlers;
pub mod lexical;
pub mod normalize;
pub mod role;
pub mod semantic;
