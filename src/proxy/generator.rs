use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::OutputConfig;
use crate::errors::{AppError, AppResult};
use crate::models::RewrittenEntry;

pub const M3U_HEADER: &str = "#EXTM3U";
pub const NO_MATCHES_COMMENT: &str = "# No matching channels found";

/// Renders curated entries and publishes them to the output file
pub struct PlaylistGenerator {
    output: OutputConfig,
}

impl PlaylistGenerator {
    pub fn new(output: OutputConfig) -> Self {
        Self { output }
    }

    pub fn output_path(&self) -> &Path {
        &self.output.path
    }

    /// Render the playlist text. An empty entry list still yields a valid
    /// playlist: the header plus a comment saying nothing matched.
    pub fn render(&self, entries: &[RewrittenEntry]) -> String {
        if entries.is_empty() {
            return format!("{M3U_HEADER}\n{NO_MATCHES_COMMENT}\n");
        }

        let mut m3u = format!("{M3U_HEADER}\n# Updated By {}\n\n", self.output.attribution);
        for entry in entries {
            m3u.push_str(&entry.to_string());
            m3u.push('\n');
        }
        m3u
    }

    /// Write `content` to the output path and apply the configured mode.
    ///
    /// The content goes to a hidden sibling file first and is renamed over the
    /// target, so readers never see a half-written playlist and a failed
    /// write leaves any previous playlist in place.
    pub async fn publish(&self, content: &str) -> AppResult<PathBuf> {
        let target = self.output.path.clone();
        let temp = temp_path_for(&target)?;

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::write(parent, e))?;
        }

        if let Err(e) = tokio::fs::write(&temp, content).await {
            remove_temp(&temp).await;
            return Err(AppError::write(&temp, e));
        }
        debug!("Wrote {} bytes to temporary file {}", content.len(), temp.display());

        if let Err(e) = tokio::fs::rename(&temp, &target).await {
            remove_temp(&temp).await;
            return Err(AppError::write(&target, e));
        }

        set_mode(&target, self.output.file_mode).await?;

        info!(
            "Playlist published: file={} bytes={}",
            target.display(),
            content.len()
        );
        Ok(target)
    }
}

fn temp_path_for(target: &Path) -> AppResult<PathBuf> {
    let file_name = target.file_name().ok_or_else(|| {
        AppError::write(
            target,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "output path has no file name"),
        )
    })?;
    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(file_name);
    temp_name.push(".tmp");
    Ok(target.with_file_name(temp_name))
}

async fn remove_temp(temp: &Path) {
    if let Err(e) = tokio::fs::remove_file(temp).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove temporary file {}: {}", temp.display(), e);
        }
    }
}

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> AppResult<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .await
        .map_err(|e| AppError::write(path, e))?;
    debug!("Set mode {:o} on {}", mode, path.display());
    Ok(())
}

#[cfg(not(unix))]
async fn set_mode(path: &Path, mode: u32) -> AppResult<()> {
    debug!(
        "Skipping mode {:o} on {}: not supported on this platform",
        mode,
        path.display()
    );
    Ok(())
}
