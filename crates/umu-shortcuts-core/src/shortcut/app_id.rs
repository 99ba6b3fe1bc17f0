//! Non-Steam shortcut app id derivation.
//!
//! The id is derived from a SHA-256 of the executable's contents, so the same
//! binary always maps to the same id:
//!
//! ```text
//! h  = u32::from_le_bytes(sha256(exe)[0..4])
//! id = -(h & 0x7FFF_FFFF) - 1        // always in [-2^31, -1]
//! ```
//!
//! The unsigned reinterpretation of `id` (the "steam file id") names the
//! artwork files in Steam's `grid` directory.

use crate::config::HashConfig;
use crate::{Result, ShortcutError};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Signed 32-bit app id of a non-Steam shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortcutAppId(i32);

impl ShortcutAppId {
    pub const fn from_raw(value: i32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> i32 {
        self.0
    }

    /// Unsigned reinterpretation used for artwork filenames. Never persisted.
    pub const fn steam_file_id(self) -> u32 {
        self.0 as u32
    }

    /// Artwork filename for `kind` in the user's `grid` directory.
    pub fn artwork_file_name(self, kind: ArtworkKind) -> String {
        kind.file_name(self.steam_file_id())
    }
}

impl fmt::Display for ShortcutAppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Artwork slots Steam looks up for a shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtworkKind {
    /// Vertical library capsule.
    Portrait,
    /// Horizontal capsule shown in recent games.
    Wide,
    Hero,
    Logo,
    Icon,
}

impl ArtworkKind {
    pub const ALL: [ArtworkKind; 5] = [
        ArtworkKind::Portrait,
        ArtworkKind::Wide,
        ArtworkKind::Hero,
        ArtworkKind::Logo,
        ArtworkKind::Icon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtworkKind::Portrait => "portrait",
            ArtworkKind::Wide => "wide",
            ArtworkKind::Hero => "hero",
            ArtworkKind::Logo => "logo",
            ArtworkKind::Icon => "icon",
        }
    }

    pub fn file_name(&self, steam_file_id: u32) -> String {
        match self {
            ArtworkKind::Portrait => format!("{}p.png", steam_file_id),
            ArtworkKind::Wide => format!("{}.png", steam_file_id),
            ArtworkKind::Hero => format!("{}_hero.png", steam_file_id),
            ArtworkKind::Logo => format!("{}_logo.png", steam_file_id),
            ArtworkKind::Icon => format!("{}_icon.png", steam_file_id),
        }
    }
}

/// SHA-256 of a file's full contents, streamed in chunks.
pub fn hash_executable(path: impl AsRef<Path>) -> Result<[u8; 32]> {
    let path = path.as_ref();
    let unavailable = |source| ShortcutError::SourceFileUnavailable {
        path: path.to_path_buf(),
        source,
    };

    let mut file = std::fs::File::open(path).map_err(unavailable)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HashConfig::CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let bytes_read = file.read(&mut buffer).map_err(unavailable)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
        total += bytes_read as u64;
    }

    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    debug!(
        "Hashed {} ({} bytes): {}",
        path.display(),
        total,
        hex::encode(digest)
    );
    Ok(digest)
}

/// Pre-validation id from a digest: `-(h & 0x7FFF_FFFF) - 1`.
pub fn candidate_from_digest(digest: &[u8; 32]) -> i64 {
    let h = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
    -i64::from(h & 0x7FFF_FFFF) - 1
}

/// Random value with the sign bit forced on.
pub fn random_negative_id<R: Rng + ?Sized>(rng: &mut R) -> ShortcutAppId {
    ShortcutAppId((rng.random::<u32>() | 0x8000_0000) as i32)
}

/// Turn a candidate into a wire-safe id.
///
/// A candidate of exactly zero is replaced with a random negative value; the
/// result must survive a signed 32-bit pack/unpack unchanged.
pub fn finalize_candidate<R: Rng + ?Sized>(candidate: i64, rng: &mut R) -> Result<ShortcutAppId> {
    let value = if candidate == 0 {
        warn!("Derived app id is zero, substituting a random negative id");
        i64::from(random_negative_id(rng).value())
    } else {
        candidate
    };

    let packed = i32::try_from(value)
        .map_err(|_| ShortcutError::validation("appid", format!("{} does not fit in i32", value)))?
        .to_le_bytes();
    let unpacked = i32::from_le_bytes(packed);
    if i64::from(unpacked) != value {
        return Err(ShortcutError::validation(
            "appid",
            format!("{} changed across i32 round trip", value),
        ));
    }

    Ok(ShortcutAppId(unpacked))
}

/// App id for an in-memory executable image.
pub fn app_id_for_bytes(bytes: &[u8]) -> Result<ShortcutAppId> {
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&Sha256::digest(bytes));
    finalize_candidate(candidate_from_digest(&digest), &mut rand::rng())
}

/// App id for the executable at `path`.
pub fn app_id_for_executable(path: impl AsRef<Path>) -> Result<ShortcutAppId> {
    let digest = hash_executable(path)?;
    finalize_candidate(candidate_from_digest(&digest), &mut rand::rng())
}
