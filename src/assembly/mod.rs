//! Blueprint-constrained form assembly.
//!
//! - apportion: blueprint weights -> integer topic targets
//! - feasibility: can the pool supply every target
//! - selector: seeded, deficit-first item picking
//! - form: orchestration, pool-scope policy, coverage and warnings

pub mod apportion;
pub mod feasibility;
pub mod form;
pub mod rng;
pub mod selector;
pub mod types;

pub use apportion::apportion;
pub use feasibility::{check_feasibility, FeasibilityReport};
pub use form::{build_form, build_form_with_rng};
pub use rng::{LehmerRng, RandSource, SelectionRng};
pub use selector::select_items;
pub use types::{
    AssemblyError, Blueprint, ExamForm, FormRequest, ItemPoolEntry, ItemStatus, PoolScope,
    TopicCoverage, TopicTarget, TopicWeight,
};
