//! ROM discovery and per-game metadata.
//!
//! Metadata lives in JSON sidecars next to the library: `<metadata_dir>/<rom
//! stem>.json`. A ROM without a readable sidecar still gets a row, built from
//! its file name, so list indices always line up with the scanned ROMs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use shelf::{join_subtitle, ListItem};

/// File extension of the ROMs the launcher lists.
pub const ROM_EXTENSION: &str = "nes";

const MISSING_DESCRIPTION: &str = "No description found in IGDB database";
const MISSING_FIELD: &str = "Not Found";
const MISSING_COVER: &str = "not_found.png";

/// List the ROMs in `dir`, sorted by file name.
///
/// A missing directory is created and reported as empty.
pub fn scan_for_roms(dir: &Path) -> io::Result<Vec<PathBuf>> {
    if !dir.exists() {
        tracing::info!(dir = %dir.display(), "creating games directory");
        fs::create_dir_all(dir)?;
        return Ok(Vec::new());
    }

    let mut roms = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_rom_extension(&path) {
            roms.push(path);
        }
    }
    roms.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    tracing::debug!(dir = %dir.display(), count = roms.len(), "scanned for ROMs");
    Ok(roms)
}

pub(crate) fn has_rom_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ROM_EXTENSION))
}

/// Human-readable title from a ROM file name.
///
/// `Super_Mario_Bros (USA).nes` becomes `Super Mario Bros`.
pub fn clean_game_name(file_name: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(dot) => &file_name[..dot],
        None => file_name,
    };
    let name = stem.replace('_', " ");
    match name.find(" (") {
        Some(region) => name[..region].to_string(),
        None => name,
    }
}

/// One game's sidecar record. Missing keys read as empty.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameMetadata {
    pub title: String,
    pub description: String,
    pub release_year: String,
    pub publisher: String,
    pub genre: String,
    pub image_path: String,
    #[serde(alias = "igdb_url")]
    pub detail_url: String,
}

impl GameMetadata {
    /// Record shown for a ROM nobody has described yet.
    pub fn placeholder(rom: &Path, assets_dir: &Path) -> Self {
        let file_name = rom
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            title: clean_game_name(&file_name),
            description: MISSING_DESCRIPTION.to_string(),
            release_year: MISSING_FIELD.to_string(),
            publisher: MISSING_FIELD.to_string(),
            genre: MISSING_FIELD.to_string(),
            image_path: assets_dir.join(MISSING_COVER).to_string_lossy().into_owned(),
            detail_url: String::new(),
        }
    }

    /// Row content for the list. `image_path` is used as stored.
    pub fn to_list_item(&self) -> ListItem {
        let mut item = ListItem::new(self.title.clone())
            .subtitle(join_subtitle([
                self.release_year.as_str(),
                self.publisher.as_str(),
                self.genre.as_str(),
            ]))
            .description(self.description.clone());

        if !self.image_path.is_empty() {
            item = item.cover(&self.image_path);
        }
        if !self.detail_url.is_empty() {
            item = item.detail_link(self.detail_url.clone());
        }
        item
    }
}

/// Reads metadata sidecars.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    metadata_dir: PathBuf,
    assets_dir: PathBuf,
}

impl MetadataStore {
    pub fn new(metadata_dir: impl Into<PathBuf>, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            metadata_dir: metadata_dir.into(),
            assets_dir: assets_dir.into(),
        }
    }

    fn sidecar_path(&self, rom: &Path) -> Option<PathBuf> {
        let stem = rom.file_stem()?;
        let mut name = stem.to_os_string();
        name.push(".json");
        Some(self.metadata_dir.join(name))
    }

    /// Metadata for `rom`, or the placeholder when the sidecar is missing or
    /// unreadable.
    ///
    /// A relative `image_path` in a sidecar is resolved against the metadata
    /// directory. The placeholder cover stays under the assets directory.
    pub fn load(&self, rom: &Path) -> GameMetadata {
        let Some(path) = self.sidecar_path(rom) else {
            return GameMetadata::placeholder(rom, &self.assets_dir);
        };

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(rom = %rom.display(), "no metadata sidecar");
                return GameMetadata::placeholder(rom, &self.assets_dir);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read metadata");
                return GameMetadata::placeholder(rom, &self.assets_dir);
            }
        };

        match serde_json::from_str::<GameMetadata>(&contents) {
            Ok(mut metadata) => {
                if metadata.title.is_empty() {
                    metadata.title = GameMetadata::placeholder(rom, &self.assets_dir).title;
                }
                if Path::new(&metadata.image_path).is_relative() && !metadata.image_path.is_empty() {
                    metadata.image_path = self
                        .metadata_dir
                        .join(&metadata.image_path)
                        .to_string_lossy()
                        .into_owned();
                }
                metadata
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid metadata");
                GameMetadata::placeholder(rom, &self.assets_dir)
            }
        }
    }

    /// One list row per ROM, in the same order.
    pub fn list_items(&self, roms: &[PathBuf]) -> Vec<ListItem> {
        roms.iter()
            .map(|rom| self.load(rom).to_list_item())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_name_strips_extension_underscores_and_region() {
        assert_eq!(clean_game_name("Super_Mario_Bros (USA).nes"), "Super Mario Bros");
        assert_eq!(clean_game_name("Contra.nes"), "Contra");
        assert_eq!(clean_game_name("Dr._Mario.v1.nes"), "Dr. Mario.v1");
        assert_eq!(clean_game_name("NoExtension"), "NoExtension");
    }

    #[test]
    fn scan_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let games = dir.path().join("games");

        assert!(scan_for_roms(&games).unwrap().is_empty());
        assert!(games.is_dir());
    }

    #[test]
    fn scan_lists_only_roms_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zelda.nes", "Contra.NES", "notes.txt", "metroid.nes"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("folder.nes")).unwrap();

        let names: Vec<_> = scan_for_roms(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["Contra.NES", "metroid.nes", "zelda.nes"]);
    }

    #[test]
    fn missing_sidecar_gives_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::new(dir.path(), "assets");

        let meta = store.load(Path::new("/roms/Mega_Man_2 (USA).nes"));
        assert_eq!(meta.title, "Mega Man 2");
        assert_eq!(meta.description, MISSING_DESCRIPTION);
        assert_eq!(meta.publisher, "Not Found");
        assert_eq!(meta.image_path, Path::new("assets").join("not_found.png").to_string_lossy());

        let item = meta.to_list_item();
        assert_eq!(item.subtitle, "Not Found | Not Found | Not Found");
        assert!(item.detail_link.is_none());
    }

    #[test]
    fn sidecar_fills_the_row() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("contra.json"),
            r#"{
                "title": "Contra",
                "description": "Run and gun.",
                "release_year": "1988",
                "publisher": "Konami",
                "genre": "Shooter",
                "image_path": "covers/contra.png",
                "igdb_url": "https://www.igdb.com/games/contra"
            }"#,
        )
        .unwrap();
        let store = MetadataStore::new(dir.path(), "assets");

        let items = store.list_items(&[PathBuf::from("contra.nes")]);
        let item = &items[0];
        assert_eq!(item.title, "Contra");
        assert_eq!(item.subtitle, "1988 | Konami | Shooter");
        assert_eq!(item.cover_image_path, Some(dir.path().join("covers/contra.png")));
        assert_eq!(item.detail_link.as_deref(), Some("https://www.igdb.com/games/contra"));
    }

    #[test]
    fn partial_sidecar_keeps_file_title_and_skips_empty_fields() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Kid_Icarus.json"), r#"{"genre": "Platform"}"#).unwrap();
        let store = MetadataStore::new(dir.path(), "assets");

        let item = store.load(Path::new("Kid_Icarus.nes")).to_list_item();
        assert_eq!(item.title, "Kid Icarus");
        assert_eq!(item.subtitle, "Platform");
        assert!(item.cover_image_path.is_none());
        assert!(item.detail_link.is_none());
    }

    #[test]
    fn broken_sidecar_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("metroid.json"), "{ not json").unwrap();
        let store = MetadataStore::new(dir.path(), "assets");

        let meta = store.load(Path::new("metroid.nes"));
        assert_eq!(meta.title, "metroid");
        assert_eq!(meta.release_year, "Not Found");
    }

    #[test]
    fn placeholder_cover_decodes_with_relative_dirs() {
        use crate::decode::FileDecoder;
        use shelf::ImageDecoder;

        // `root` stands in for the working directory the launcher runs from.
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("assets")).unwrap();
        image::RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255]))
            .save(root.path().join("assets").join("not_found.png"))
            .unwrap();

        let store = MetadataStore::new("metadata", "assets");
        let items = store.list_items(&[PathBuf::from("games/Contra.nes")]);
        let cover = items[0].cover_image_path.clone().expect("placeholder cover");
        assert_eq!(cover, Path::new("assets").join("not_found.png"));

        let pixmap = FileDecoder::new(root.path()).decode(&cover).unwrap();
        assert_eq!(pixmap.dimensions(), (2, 2));
    }
}
