use std::path::PathBuf;

#[derive(Clone)]
pub struct AppState {
    pub index_file: PathBuf,
}
