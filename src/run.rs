//! Sorted runs persistence.
//!
//! A run is a sorted sequence stored in a file. Runs are loaded into memory as a whole, merged,
//! and the result can be saved back using the same format.

use std::cmp::Ordering;
use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::Path;
use std::str::FromStr;

/// Run loading or saving error.
#[derive(Debug)]
pub enum RunError {
    /// Common I/O error.
    IO(io::Error),
    /// Text item parsing error.
    Parse { line: usize, reason: String },
    /// Data serialization error.
    SerializationError(rmp_serde::encode::Error),
    /// Data deserialization error.
    DeserializationError(rmp_serde::decode::Error),
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self {
            RunError::IO(err) => Some(err),
            RunError::Parse { .. } => None,
            RunError::SerializationError(err) => Some(err),
            RunError::DeserializationError(err) => Some(err),
        }
    }
}

impl Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            RunError::IO(err) => write!(f, "I/O operation failed: {}", err),
            RunError::Parse { line, reason } => write!(f, "line {} parsing error: {}", line, reason),
            RunError::SerializationError(err) => write!(f, "data serialization error: {}", err),
            RunError::DeserializationError(err) => write!(f, "data deserialization error: {}", err),
        }
    }
}

impl From<io::Error> for RunError {
    fn from(err: io::Error) -> Self {
        RunError::IO(err)
    }
}

/// Run codec interface. Provides methods for reading a run from a stream and writing it back.
/// Codecs do not check that items are sorted.
pub trait RunCodec<T> {
    /// Reads all items from the reader.
    fn decode<R: Read>(reader: R) -> Result<Vec<T>, RunError>;

    /// Writes items to the writer.
    fn encode<W: Write>(writer: W, items: &[T]) -> Result<(), RunError>;
}

/// Line-oriented text codec. Every line holds a single item.
pub struct LineCodec;

impl<T> RunCodec<T> for LineCodec
where
    T: FromStr + Display,
    T::Err: Display,
{
    fn decode<R: Read>(reader: R) -> Result<Vec<T>, RunError> {
        io::BufReader::new(reader)
            .lines()
            .enumerate()
            .map(|(idx, line)| {
                line?.parse().map_err(|err: T::Err| RunError::Parse {
                    line: idx + 1,
                    reason: err.to_string(),
                })
            })
            .collect()
    }

    fn encode<W: Write>(writer: W, items: &[T]) -> Result<(), RunError> {
        let mut writer = io::BufWriter::new(writer);
        for item in items {
            writeln!(writer, "{}", item)?;
        }
        writer.flush()?;

        return Ok(());
    }
}

/// RMP (Rust MessagePack) codec.
/// It uses MessagePack as a data serialization format, items are stored one after another.
/// For more information see https://msgpack.org/.
pub struct RmpCodec;

impl<T> RunCodec<T> for RmpCodec
where
    T: serde::ser::Serialize + serde::de::DeserializeOwned,
{
    fn decode<R: Read>(mut reader: R) -> Result<Vec<T>, RunError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        let data_len = data.len() as u64;
        let mut cursor = io::Cursor::new(data.as_slice());
        let mut items = Vec::new();
        while cursor.position() < data_len {
            let item = rmp_serde::decode::from_read(&mut cursor).map_err(RunError::DeserializationError)?;
            items.push(item);
        }

        return Ok(items);
    }

    fn encode<W: Write>(writer: W, items: &[T]) -> Result<(), RunError> {
        let mut writer = io::BufWriter::new(writer);
        for item in items {
            rmp_serde::encode::write(&mut writer, item).map_err(RunError::SerializationError)?;
        }
        writer.flush()?;

        return Ok(());
    }
}

/// Returns the index of the first item that is greater than the next one according to `compare`.
/// Pairs that fail to compare are skipped, they are reported by the merge itself.
pub fn find_unsorted<T, E, F>(items: &[T], mut compare: F) -> Option<usize>
where
    F: FnMut(&T, &T) -> Result<Ordering, E>,
{
    items
        .windows(2)
        .position(|pair| matches!(compare(&pair[0], &pair[1]), Ok(Ordering::Greater)))
}

/// Loads a run from a file.
pub fn load_run<T, C: RunCodec<T>>(path: &Path) -> Result<Vec<T>, RunError> {
    let file = fs::File::open(path)?;
    C::decode(file)
}

/// Saves a run to a file. The file is created or truncated.
pub fn save_run<T, C: RunCodec<T>>(path: &Path, items: &[T]) -> Result<(), RunError> {
    let file = fs::File::create(path)?;
    C::encode(file, items)
}

#[cfg(test)]
mod test {
    use std::io;

    use rstest::*;

    use super::{find_unsorted, load_run, save_run, LineCodec, RmpCodec, RunCodec, RunError};
    use crate::merge::partial_compare;

    #[fixture]
    fn tmp_dir() -> tempfile::TempDir {
        tempfile::tempdir_in("./").unwrap()
    }

    #[rstest]
    fn test_rmp_run(tmp_dir: tempfile::TempDir) {
        let saved: Vec<(String, i64)> = (0..100).map(|i| (format!("item-{:03}", i), i)).collect();
        let path = tmp_dir.path().join("run.rmp");

        save_run::<_, RmpCodec>(&path, &saved).unwrap();
        let restored: Vec<(String, i64)> = load_run::<_, RmpCodec>(&path).unwrap();

        assert_eq!(restored, saved);
    }

    #[rstest]
    fn test_line_run(tmp_dir: tempfile::TempDir) {
        let path = tmp_dir.path().join("run.txt");
        std::fs::write(&path, "-3\n0\n7\n").unwrap();

        let restored: Vec<i64> = load_run::<_, LineCodec>(&path).unwrap();
        assert_eq!(restored, vec![-3, 0, 7]);
    }

    #[test]
    fn test_line_codec_parse_error() {
        let input = io::Cursor::new("1\n2\nthree\n4\n");

        let result: Result<Vec<i32>, RunError> = LineCodec::decode(input);
        match result {
            Err(RunError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_line_codec_encode() {
        let mut output = Vec::new();
        <LineCodec as RunCodec<f64>>::encode(&mut output, &[0.5, 1.0, f64::NAN]).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "0.5\n1\nNaN\n");
    }

    #[test]
    fn test_rmp_codec_truncated_input() {
        let mut output = Vec::new();
        <RmpCodec as RunCodec<String>>::encode(&mut output, &["hello".to_string()]).unwrap();
        output.pop();

        let result: Result<Vec<String>, RunError> = RmpCodec::decode(io::Cursor::new(output));
        assert!(matches!(result, Err(RunError::DeserializationError(_))));
    }

    #[rstest]
    #[case(vec![], None)]
    #[case(vec![1.0], None)]
    #[case(vec![1.0, 2.0, 2.0, 3.0], None)]
    #[case(vec![1.0, 3.0, 2.0, 0.0], Some(1))]
    #[case(vec![1.0, f64::NAN], None)]
    #[case(vec![f64::NAN, 1.0, 0.5], Some(1))]
    fn test_find_unsorted(#[case] items: Vec<f64>, #[case] expected_result: Option<usize>) {
        assert_eq!(find_unsorted(&items, partial_compare), expected_result);
    }
}
