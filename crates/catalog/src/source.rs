//! Where assets come from.

use exn::ResultExt;
use rust_embed::Embed;
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

use crate::Compression;
use crate::error::{Error, ErrorKind, Result};

const EXTENSION: &str = "json";

/// A named collection of JSON assets.
///
/// Names are file stems such as `bible_en` or `curated_verses`; sources add
/// their own extension and handle any compression.
pub trait AssetSource: Send + Sync {
    /// Name of the source, used for logging only.
    fn name(&self) -> &str;

    /// Load the (decompressed) bytes of an asset.
    ///
    /// Returns `Ok(None)` if this source simply doesn't have the asset, and
    /// an error if it has it but cannot read it.
    fn load(&self, asset: &str) -> Result<Option<Cow<'static, [u8]>>>;

    /// Load an asset, treating absence as an error.
    fn require(&self, asset: &str) -> Result<Cow<'static, [u8]>> {
        self.load(asset)?.ok_or_else(|| Error::from(ErrorKind::AssetNotFound(asset.to_string())))
    }
}

fn validate(asset: &str) -> Result<&str> {
    let valid = !asset.is_empty() && asset.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    match valid {
        true => Ok(asset),
        false => exn::bail!(ErrorKind::InvalidAssetName(asset.to_string())),
    }
}

/// Assets compiled into the binary.
#[derive(Embed)]
#[folder = "../../assets/"]
pub struct Builtins;
impl Builtins {
    /// List all embedded asset names, without extension.
    pub fn list() -> Vec<String> {
        Self::iter().filter_map(|f| f.strip_suffix(".json").map(str::to_string)).collect()
    }

    pub fn exists(asset: impl AsRef<str>) -> bool {
        Self::get(&format!("{}.{EXTENSION}", asset.as_ref())).is_some()
    }
}
impl AssetSource for Builtins {
    fn name(&self) -> &str {
        "builtin"
    }

    fn load(&self, asset: &str) -> Result<Option<Cow<'static, [u8]>>> {
        let asset = validate(asset)?;
        Ok(<Self as Embed>::get(&format!("{asset}.{EXTENSION}")).map(|f| f.data))
    }
}

/// Assets in a directory on disk, optionally compressed.
///
/// For an asset `bible_ru` the directory is searched for `bible_ru.json`,
/// then `bible_ru.json.gz`, then `bible_ru.json.bz2`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    name: String,
    root: PathBuf,
}
impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self { name: format!("dir:{}", root.display()), root }
    }
}
impl AssetSource for DirectorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, asset: &str) -> Result<Option<Cow<'static, [u8]>>> {
        let asset = validate(asset)?;
        for format in Compression::ALL {
            let path = self.root.join(format!("{asset}.{EXTENSION}{}", format.suffix()));
            let raw = match std::fs::read(&path) {
                Ok(raw) => raw,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e).or_raise(|| ErrorKind::Io(path)),
            };
            tracing::debug!(path = %path.display(), ?format, "Reading asset from data directory");
            let data = match format {
                Compression::None => raw,
                _ => format.decompress(asset, &raw)?,
            };
            return Ok(Some(Cow::Owned(data)));
        }
        Ok(None)
    }
}

/// Several sources searched in order; the first one that has an asset wins.
///
/// A source that fails to read an asset it has is logged and skipped, so a
/// broken override falls back to the next layer. The first such error is
/// returned only if no later layer has the asset either.
#[derive(Clone)]
pub struct Layered {
    layers: Vec<Arc<dyn AssetSource>>,
}
impl Layered {
    pub fn new(layers: impl IntoIterator<Item = Arc<dyn AssetSource>>) -> Self {
        Self { layers: layers.into_iter().collect() }
    }

    /// The data directory (if any) layered over the embedded assets.
    pub fn with_builtins(directory: Option<impl Into<PathBuf>>) -> Self {
        let mut layers: Vec<Arc<dyn AssetSource>> = Vec::new();
        if let Some(directory) = directory {
            layers.push(Arc::new(DirectorySource::new(directory)));
        }
        layers.push(Arc::new(Builtins));
        Self { layers }
    }
}
impl AssetSource for Layered {
    fn name(&self) -> &str {
        "layered"
    }

    fn load(&self, asset: &str) -> Result<Option<Cow<'static, [u8]>>> {
        let mut first_error = None;
        for layer in &self.layers {
            match layer.load(asset) {
                Ok(Some(data)) => return Ok(Some(data)),
                Ok(None) => {},
                Err(err) => {
                    tracing::warn!(source = layer.name(), asset, error = ?err, "Skipping unreadable asset");
                    first_error.get_or_insert(err);
                },
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tests::compress;
    use rstest::rstest;

    #[test]
    fn builtins_include_shipped_assets() {
        assert!(Builtins::exists("bible_en"));
        assert!(Builtins::exists("curated_verses"));
        let names = Builtins::list();
        assert!(names.iter().any(|n| n == "bible_en"));
        assert!(Builtins.load("bible_ko").unwrap().is_none());
    }

    #[rstest]
    #[case("")]
    #[case("../secret")]
    #[case("bible_en.json")]
    #[case("a/b")]
    fn invalid_asset_names(#[case] asset: &str) {
        let err = Builtins.load(asset).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidAssetName(_)));
        let dir = DirectorySource::new("/nonexistent");
        assert!(dir.load(asset).is_err());
    }

    #[rstest]
    #[case(Compression::None)]
    #[case(Compression::Gzip)]
    #[case(Compression::Bzip2)]
    fn directory_reads_compressed_assets(#[case] format: Compression) {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join(format!("bible_xx.json{}", format.suffix()));
        std::fs::write(&file, compress(format, b"{\"verses\": {}}")).unwrap();
        let source = DirectorySource::new(temp_dir.path());
        assert_eq!(source.load("bible_xx").unwrap().unwrap().as_ref(), b"{\"verses\": {}}");
        assert!(source.load("bible_yy").unwrap().is_none());
    }

    #[test]
    fn directory_prefers_uncompressed() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("a.json"), b"plain").unwrap();
        std::fs::write(temp_dir.path().join("a.json.gz"), compress(Compression::Gzip, b"gzip")).unwrap();
        assert_eq!(DirectorySource::new(temp_dir.path()).load("a").unwrap().unwrap().as_ref(), b"plain");
    }

    #[test]
    fn layered_prefers_earlier_layers() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("curated_verses.json"), b"[\"GEN.1.1\"]").unwrap();
        let layered = Layered::with_builtins(Some(temp_dir.path()));
        assert_eq!(layered.load("curated_verses").unwrap().unwrap().as_ref(), b"[\"GEN.1.1\"]");
        // Falls through to the embedded copy.
        assert!(layered.load("bible_en").unwrap().is_some());
        assert!(layered.load("bible_ko").unwrap().is_none());
        assert!(matches!(&*layered.require("bible_ko").unwrap_err(), ErrorKind::AssetNotFound(_)));
    }

    #[test]
    fn layered_skips_broken_override() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("bible_en.json.gz"), b"not gzip").unwrap();
        std::fs::write(temp_dir.path().join("bible_xx.json.bz2"), b"not bzip2").unwrap();
        let layered = Layered::with_builtins(Some(temp_dir.path()));
        assert!(layered.load("bible_en").unwrap().is_some());
        let err = layered.load("bible_xx").unwrap_err();
        assert!(matches!(&*err, ErrorKind::Decompression(_)));
    }
}
