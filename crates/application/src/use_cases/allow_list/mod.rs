mod allow_list_store;

pub use allow_list_store::AllowListStore;
