use async_trait::async_trait;
use solr_sync_indexer::{ContentSource, Page, PageRequest};
use solr_sync_protocol::{Document, FailureDetail, Selection};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Content items stored one JSON object per line.
///
/// Every call streams the file from the start; at most one page is held in memory.
/// Blank lines are ignored. Lines that are not UTF-8 JSON objects are skipped with a warning,
/// consistently for counting and paging.
#[derive(Debug, Clone)]
pub struct JsonlContentSource {
    path: PathBuf,
}

impl JsonlContentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn open(&self) -> Result<EligibleItems, FailureDetail> {
        let file = File::open(&self.path).await.map_err(|err| {
            FailureDetail::io(format!("cannot open content file {}", self.path.display()))
                .with_cause(err)
        })?;
        Ok(EligibleItems {
            reader: BufReader::new(file),
            buf: Vec::new(),
            line_no: 0,
        })
    }
}

struct EligibleItems {
    reader: BufReader<File>,
    buf: Vec<u8>,
    line_no: u64,
}

impl EligibleItems {
    /// Next item matching `selection`, or `None` at end of file.
    async fn next(&mut self, selection: &Selection) -> Result<Option<Document>, FailureDetail> {
        loop {
            self.buf.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut self.buf)
                .await
                .map_err(|err| FailureDetail::io("failed to read content file").with_cause(err))?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let Ok(line) = std::str::from_utf8(&self.buf) else {
                log::warn!("skipping line {}: not valid UTF-8", self.line_no);
                continue;
            };
            if line.trim().is_empty() {
                continue;
            }
            let document = serde_json::from_str::<serde_json::Value>(line)
                .ok()
                .and_then(Document::from_value);
            match document {
                Some(document) if selection.matches(&document) => return Ok(Some(document)),
                Some(_) => {}
                None => log::warn!("skipping line {}: not a JSON object", self.line_no),
            }
        }
    }
}

#[async_trait]
impl ContentSource for JsonlContentSource {
    async fn count_eligible(&self, selection: &Selection) -> Result<u64, FailureDetail> {
        let mut items = self.open().await?;
        let mut count = 0;
        while items.next(selection).await?.is_some() {
            count += 1;
        }
        log::debug!("{} eligible items in {}", count, self.path.display());
        Ok(count)
    }

    async fn fetch_page(
        &self,
        selection: &Selection,
        request: &PageRequest,
    ) -> Result<Page, FailureDetail> {
        let mut items = self.open().await?;
        for _ in 0..request.offset {
            if items.next(selection).await?.is_none() {
                return Ok(Page {
                    items: Vec::new(),
                    is_last: true,
                });
            }
        }

        let mut page = Vec::with_capacity(request.batch_size);
        while page.len() < request.batch_size {
            match items.next(selection).await? {
                Some(document) => page.push(document),
                None => {
                    return Ok(Page {
                        items: page,
                        is_last: true,
                    })
                }
            }
        }
        // one item of lookahead tells whether this page was the last
        let is_last = items.next(selection).await?.is_none();
        Ok(Page {
            items: page,
            is_last,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    fn ids(page: &Page) -> Vec<String> {
        page.items.iter().filter_map(Document::id).collect()
    }

    fn request(batch: u64, batch_size: usize) -> PageRequest {
        PageRequest {
            batch,
            batch_size,
            offset: batch * batch_size as u64,
        }
    }

    #[tokio::test]
    async fn pages_follow_offsets_and_selection() {
        let file = source_file(&[
            r#"{"id": 1, "post_type": "post"}"#,
            r#"{"id": 2, "post_type": "page"}"#,
            "",
            r#"{"id": 3, "post_type": "post"}"#,
            "not json",
            r#"{"id": 4, "post_type": "post"}"#,
        ]);
        let source = JsonlContentSource::new(file.path());
        let posts = Selection::post_type("post");

        assert_eq!(source.count_eligible(&posts).await.unwrap(), 3);
        assert_eq!(source.count_eligible(&Selection::all()).await.unwrap(), 4);

        let first = source.fetch_page(&posts, &request(0, 2)).await.unwrap();
        assert_eq!(ids(&first), vec!["1", "3"]);
        assert!(!first.is_last);

        let second = source.fetch_page(&posts, &request(1, 2)).await.unwrap();
        assert_eq!(ids(&second), vec!["4"]);
        assert!(second.is_last);

        let past_end = source.fetch_page(&posts, &request(5, 2)).await.unwrap();
        assert!(past_end.items.is_empty());
        assert!(past_end.is_last);
    }

    #[tokio::test]
    async fn invalid_utf8_lines_are_skipped() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{\"id\": 1}\n\xff\xfe garbage\n{\"id\": 2}\n")
            .unwrap();
        let source = JsonlContentSource::new(file.path());

        assert_eq!(source.count_eligible(&Selection::all()).await.unwrap(), 2);

        let first = source
            .fetch_page(&Selection::all(), &request(0, 1))
            .await
            .unwrap();
        assert_eq!(ids(&first), vec!["1"]);
        assert!(!first.is_last);

        let second = source
            .fetch_page(&Selection::all(), &request(1, 1))
            .await
            .unwrap();
        assert_eq!(ids(&second), vec!["2"]);
        assert!(second.is_last);
    }

    #[tokio::test]
    async fn exact_multiple_marks_last_page() {
        let file = source_file(&[r#"{"id": "a"}"#, r#"{"id": "b"}"#]);
        let source = JsonlContentSource::new(file.path());
        let page = source
            .fetch_page(&Selection::all(), &request(0, 2))
            .await
            .unwrap();
        assert_eq!(ids(&page), vec!["a", "b"]);
        assert!(page.is_last);
    }

    #[tokio::test]
    async fn missing_file_is_an_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonlContentSource::new(dir.path().join("missing.jsonl"));
        let err = source.count_eligible(&Selection::all()).await.unwrap_err();
        assert_eq!(err.kind, solr_sync_protocol::FailureKind::Io);
    }
}
