use async_std::fs;
use async_std::io::{Read, ReadExt, WriteExt};
use chrono::Utc;
use futures_util::stream::{self, Stream};
use log::*;
use multer::{Constraints, Field, Multipart, SizeLimit};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::AppError;

/**
 * Name of the multipart field carrying the image
 */
pub const IMAGE_FIELD: &str = "image";

const CHUNK_SIZE: usize = 16 * 1024;

/**
 * Directory holding uploaded images
 */
#[derive(Clone, Debug)]
pub struct UploadDir {
    root: PathBuf,
    max_bytes: u64,
}

impl UploadDir {
    pub fn new<P: Into<PathBuf>>(root: P, max_bytes: u64) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_exists(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /**
     * Stream the `image` field of a `multipart/form-data` body to disk
     *
     * Returns the name the file was stored under. `NoFile` when the body is not multipart or has
     * no image field, `TooLarge` once the body passes the size limit. Nothing is left on disk
     * when the upload fails.
     */
    pub async fn receive<R>(&self, content_type: Option<&str>, body: R) -> Result<String, AppError>
    where
        R: Read + Unpin + Send + 'static,
    {
        let boundary = content_type
            .and_then(|ct| multer::parse_boundary(ct).ok())
            .ok_or(AppError::NoFile)?;

        let constraints = Constraints::new().size_limit(
            SizeLimit::new()
                .whole_stream(self.max_bytes)
                .per_field(self.max_bytes),
        );
        let mut multipart = Multipart::with_constraints(chunks(body), boundary, constraints);

        while let Some(mut field) = multipart.next_field().await.map_err(rejected)? {
            if field.name() != Some(IMAGE_FIELD) {
                continue;
            }

            let name = stored_name(IMAGE_FIELD, field.file_name());
            let path = self.root.join(&name);
            return match write_field(&mut field, &path).await {
                Ok(size) => {
                    info!("Stored upload {} ({} bytes)", name, size);
                    Ok(name)
                }
                Err(err) => {
                    let _ = fs::remove_file(&path).await;
                    Err(err)
                }
            };
        }
        Err(AppError::NoFile)
    }
}

/**
 * Reads the body in fixed-size chunks, ending after the first read error
 */
fn chunks<R>(reader: R) -> impl Stream<Item = std::io::Result<Vec<u8>>> + Send + 'static
where
    R: Read + Unpin + Send + 'static,
{
    stream::unfold(Some(reader), |state| async move {
        let mut reader = state?;
        let mut buf = vec![0; CHUNK_SIZE];
        match reader.read(&mut buf).await {
            Ok(0) => None,
            Ok(n) => {
                buf.truncate(n);
                Some((Ok(buf), Some(reader)))
            }
            Err(err) => Some((Err(err), None)),
        }
    })
}

async fn write_field(field: &mut Field<'_>, path: &Path) -> Result<u64, AppError> {
    let mut file = fs::File::create(path).await?;
    let mut written = 0;
    while let Some(chunk) = field.chunk().await.map_err(rejected)? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

fn rejected(err: multer::Error) -> AppError {
    match err {
        multer::Error::FieldSizeExceeded { .. } | multer::Error::StreamSizeExceeded { .. } => {
            warn!("Upload rejected: {}", err);
            AppError::TooLarge
        }
        other => {
            warn!("Unreadable multipart body: {}", other);
            AppError::NoFile
        }
    }
}

/**
 * `<field>-<unix millis>-<random>.<extension of the original name>`
 */
fn stored_name(field: &str, original_name: Option<&str>) -> String {
    let suffix = Uuid::new_v4().to_simple().to_string();
    let base = format!("{}-{}-{}", field, Utc::now().timestamp_millis(), &suffix[..12]);

    match original_name.and_then(extension) {
        Some(ext) => format!("{}.{}", base, ext),
        None => base,
    }
}

fn extension(name: &str) -> Option<&str> {
    let name = Path::new(name).file_name()?.to_str()?;
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}
