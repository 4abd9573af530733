pub mod toml_loader;

pub use toml_loader::{
    load_all_bank_files, load_all_design_requests, load_bank_file, load_design_request,
};
