use rand::Rng;

/// Image storage seam. The store accepts the staff upload path and returns
/// the stable URL the core keeps; the bytes themselves never pass through
/// this service.
pub trait BlobStore: Send + Sync {
    fn put(&self, file_path: &str) -> anyhow::Result<String>;
}

pub struct StaticBlobStore {
    pub base_url: String,
}

impl StaticBlobStore {
    pub fn new(base_url: String) -> StaticBlobStore {
        StaticBlobStore { base_url }
    }
}

fn random_object_name(extension: &str) -> String {
    let charset: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut rng = rand::rng();
    let name: String = (0..12)
        .map(|_| {
            let idx = rng.random_range(0..charset.len());
            charset[idx] as char
        })
        .collect();
    if extension.is_empty() {
        name
    } else {
        format!("{name}.{extension}")
    }
}

impl BlobStore for StaticBlobStore {
    fn put(&self, file_path: &str) -> anyhow::Result<String> {
        let extension = std::path::Path::new(file_path)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();
        Ok(format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            random_object_name(&extension)
        ))
    }
}
