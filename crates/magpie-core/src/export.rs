use crate::post::Post;
use crate::Result;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub struct CsvExporter;

impl CsvExporter {
    /// Write posts to a CSV file: one header row, then one row per post
    /// in collection order.
    ///
    /// An empty sequence writes nothing and does not create the file.
    pub fn to_file(posts: &[Post], path: &Path) -> Result<()> {
        if posts.is_empty() {
            tracing::warn!("no posts collected, skipping {}", path.display());
            return Ok(());
        }

        tracing::debug!("writing {} posts to {}", posts.len(), path.display());

        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(BufWriter::new(file));
        for post in posts {
            writer.serialize(post)?;
        }
        writer.flush()?;

        tracing::info!(
            "wrote {} posts to {}",
            posts.len(),
            path.display()
        );

        Ok(())
    }

    /// Render posts as a CSV string (header + rows), mainly for tests.
    pub fn to_string(posts: &[Post]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for post in posts {
            writer.serialize(post)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| crate::Error::InvalidRecord(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| crate::Error::InvalidRecord(e.to_string()))
    }
}
