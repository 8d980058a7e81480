mod field_bindings;
mod preference_store;

pub use field_bindings::{FieldBinding, FieldBindings, FieldSnapshot};
pub use preference_store::PreferenceStore;
