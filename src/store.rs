//! In-memory sample store backed by a CSV file

use crate::error::HpiError;
use crate::metrics::{APPENDED_SAMPLES, LOADED_SAMPLES};
use crate::models::NewSample;
use crate::sample::{Sample, Schema, YEAR};

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// An ordered collection of samples sharing a schema.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    schema: Arc<Schema>,
    samples: Vec<Sample>,
}

impl Dataset {
    /// Parse a dataset from CSV data whose first row holds the column names.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than dropping the row.
    /// Short rows are padded and long rows truncated to the width of the header. Rows that
    /// cannot be read are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Self {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = match reader.byte_headers() {
            Ok(headers) => headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let header = decode_field(header);
                    if i == 0 {
                        header.trim_start_matches('\u{feff}').to_string()
                    } else {
                        header
                    }
                })
                .collect(),
            Err(err) => {
                error!(%err, "failed to read CSV header, starting with an empty dataset");
                return Self::default();
            }
        };
        let schema = Arc::new(Schema::new(headers));

        let mut samples = Vec::new();
        for (row, record) in reader.byte_records().enumerate() {
            match record {
                Ok(record) => samples.push(Sample::new(
                    schema.clone(),
                    record.iter().map(decode_field).collect(),
                )),
                Err(err) => {
                    let fatal = matches!(err.kind(), csv::ErrorKind::Io(_));
                    warn!(row = row + 1, %err, "skipping unreadable CSV row");
                    if fatal {
                        break;
                    }
                }
            }
        }

        Self { schema, samples }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Sample store.
///
/// Holds the dataset in memory and appends new samples to the backing CSV file. Readers get an
/// immutable snapshot of the dataset. Appends are serialised, and a sample only becomes visible
/// in memory once it has been durably written to the file.
#[derive(Debug)]
pub struct DataStore {
    /// Path to the backing CSV file.
    path: PathBuf,
    /// Current dataset. The lock is only held to swap or clone the pointer.
    dataset: RwLock<Arc<Dataset>>,
    /// Serialises appends across the file write and the in-memory push.
    writer: Mutex<()>,
}

impl DataStore {
    /// Load the store from a CSV file.
    ///
    /// A file that cannot be opened is not fatal: the condition is logged and the store starts
    /// out empty. The file is created by the first append.
    ///
    /// # Arguments
    ///
    /// * `path`: Path to the backing CSV file
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let dataset = match File::open(&path) {
            Ok(file) => Dataset::from_reader(file),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "data file not found, starting with an empty dataset");
                Dataset::default()
            }
            Err(err) => {
                error!(path = %path.display(), %err, "failed to open data file, starting with an empty dataset");
                Dataset::default()
            }
        };
        info!(
            path = %path.display(),
            samples = dataset.len(),
            columns = dataset.schema().len(),
            "loaded dataset"
        );
        LOADED_SAMPLES.set(dataset.len() as i64);

        Self {
            path,
            dataset: RwLock::new(Arc::new(dataset)),
            writer: Mutex::new(()),
        }
    }

    /// Returns the current dataset.
    ///
    /// Later appends are not reflected in the returned snapshot.
    pub fn snapshot(&self) -> Arc<Dataset> {
        self.dataset
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Append a sample.
    ///
    /// Every column of the dataset takes its value from `input`, or an empty string if absent.
    /// An absent `Year` defaults to the current year. Fields of `input` that are not columns of
    /// the dataset are dropped. If the dataset has no columns yet, the default columns are used
    /// and written as the header of the file. That is only done while the file is empty: a file
    /// with content but no columns is never appended to.
    ///
    /// The record is written and synced to the backing file before it is added to the in-memory
    /// dataset. If the write fails the file is truncated back to its previous length and the
    /// dataset is left untouched.
    ///
    /// Returns the stored sample.
    ///
    /// # Arguments
    ///
    /// * `input`: Field values of the new sample
    #[tracing::instrument(level = "DEBUG", skip(self, input))]
    pub async fn append(&self, input: &NewSample) -> Result<Sample, HpiError> {
        let _writer = self.writer.lock().await;

        let current_schema = self.snapshot().schema().clone();
        let (schema, write_header) = if current_schema.is_empty() {
            (Arc::new(Schema::default_columns()), true)
        } else {
            (current_schema, false)
        };

        let mut values: Vec<String> = schema
            .headers()
            .iter()
            .map(|header| input.value(header).unwrap_or_default())
            .collect();
        if let Some(position) = schema.position(YEAR) {
            if values[position].is_empty() {
                values[position] = current_year().to_string();
            }
        }

        let mut chunk = Vec::new();
        if write_header {
            chunk.extend(encode_record(schema.headers())?);
        }
        chunk.extend(encode_record(&values)?);
        self.write_chunk(chunk, write_header).await?;

        let sample = Sample::new(schema.clone(), values);
        {
            let mut guard = self.dataset.write().unwrap_or_else(PoisonError::into_inner);
            // Copies the dataset only if a reader still holds the previous snapshot.
            let dataset = Arc::make_mut(&mut *guard);
            if write_header {
                dataset.schema = schema;
            }
            dataset.samples.push(sample.clone());
        }
        APPENDED_SAMPLES.inc();
        debug!(path = %self.path.display(), "appended sample");
        Ok(sample)
    }

    /// Append encoded records to the backing file, separated from existing content by a newline.
    ///
    /// When `starts_file` is set the chunk begins with a header, so the file must be empty.
    async fn write_chunk(&self, chunk: Vec<u8>, starts_file: bool) -> Result<(), HpiError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let length = file.metadata().await?.len();
        if starts_file && length > 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "data file {} has content but no header row",
                    self.path.display()
                ),
            )
            .into());
        }

        let mut bytes = Vec::with_capacity(chunk.len() + 1);
        if length > 0 {
            bytes.push(b'\n');
        }
        bytes.extend(chunk);
        // Records are newline terminated by the encoder; the file keeps no trailing newline.
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
        }

        let result = async {
            file.write_all(&bytes).await?;
            file.flush().await?;
            file.sync_data().await
        }
        .await;
        if let Err(err) = result {
            if let Err(truncate_err) = file.set_len(length).await {
                error!(
                    path = %self.path.display(),
                    %truncate_err,
                    "failed to roll back partial write to data file"
                );
            }
            return Err(err.into());
        }
        Ok(())
    }
}

/// Encode a single record as a newline terminated CSV line.
///
/// Fields containing the delimiter, a double quote or a line break are quoted, with embedded
/// quotes doubled.
fn encode_record<I, T>(record: I) -> Result<Vec<u8>, HpiError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(record)?;
    writer.into_inner().map_err(|err| err.into_error().into())
}

/// Decode a CSV field, replacing invalid UTF-8 sequences.
fn decode_field(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

fn current_year() -> i32 {
    time::OffsetDateTime::now_utc().year()
}
