//! Storage-unit backends.
//!
//! The full state vector is persisted as `NSU` storage units of `2^NL`
//! amplitudes each. The manager talks to the backing store only through the
//! [`StorageBackend`] capability, so the same gather/scatter code runs
//! against an in-process array (tests, small runs) or a directory of raw
//! files (out-of-core runs). Backends must be safe to drive from the
//! parallel executor: every task addresses a distinct unit.

use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use qoc_common::Amplitude;

use crate::error::{QocError, Result};

/// Capability the manager uses to read and write whole storage units.
pub trait StorageBackend: Send + Sync {
    /// Number of storage units this backend addresses.
    fn num_units(&self) -> usize;

    /// Amplitudes per storage unit (`2^NL`).
    fn unit_len(&self) -> usize;

    /// Copies unit `unit` into `buf`. `buf.len()` must equal `unit_len()`.
    fn read_unit(&self, unit: usize, buf: &mut [Amplitude]) -> Result<()>;

    /// Overwrites unit `unit` with `data`. `data.len()` must equal
    /// `unit_len()`.
    fn write_unit(&self, unit: usize, data: &[Amplitude]) -> Result<()>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Box<B> {
    fn num_units(&self) -> usize {
        (**self).num_units()
    }

    fn unit_len(&self) -> usize {
        (**self).unit_len()
    }

    fn read_unit(&self, unit: usize, buf: &mut [Amplitude]) -> Result<()> {
        (**self).read_unit(unit, buf)
    }

    fn write_unit(&self, unit: usize, data: &[Amplitude]) -> Result<()> {
        (**self).write_unit(unit, data)
    }
}

/// In-process backend: one independently locked buffer per unit.
///
/// Every fan-out task addresses a distinct unit, so the per-unit locks are
/// never contended.
pub struct MemoryBackend {
    units: Vec<Mutex<Vec<Amplitude>>>,
    unit_len: usize,
}

impl MemoryBackend {
    pub fn new(num_units: usize, unit_len: usize) -> Self {
        let units = (0..num_units)
            .map(|_| Mutex::new(vec![Amplitude::ZERO; unit_len]))
            .collect();
        Self { units, unit_len }
    }

    fn unit(&self, unit: usize) -> Result<&Mutex<Vec<Amplitude>>> {
        self.units.get(unit).ok_or_else(|| QocError::StorageIo {
            unit,
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such storage unit"),
        })
    }
}

impl StorageBackend for MemoryBackend {
    fn num_units(&self) -> usize {
        self.units.len()
    }

    fn unit_len(&self) -> usize {
        self.unit_len
    }

    fn read_unit(&self, unit: usize, buf: &mut [Amplitude]) -> Result<()> {
        let guard = self.unit(unit)?.lock().expect("storage unit lock poisoned");
        buf.copy_from_slice(&guard);
        Ok(())
    }

    fn write_unit(&self, unit: usize, data: &[Amplitude]) -> Result<()> {
        let mut guard = self.unit(unit)?.lock().expect("storage unit lock poisoned");
        guard.copy_from_slice(data);
        Ok(())
    }
}

/// Directory-of-files backend.
///
/// Unit `i` lives at `<root>/sv{i}` as `unit_len` raw complex128 values in
/// native byte order, 16 bytes each, no header. Names are stable across
/// runs so a finished state vector can be inspected or resumed from.
pub struct FileBackend {
    root: PathBuf,
    num_units: usize,
    unit_len: usize,
}

impl FileBackend {
    /// Creates the backend, creating `root` if needed.
    pub fn new(root: impl Into<PathBuf>, num_units: usize, unit_len: usize) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| QocError::StorageIo { unit: 0, source })?;
        Ok(Self {
            root,
            num_units,
            unit_len,
        })
    }

    /// Path of unit `i`.
    pub fn unit_path(&self, unit: usize) -> PathBuf {
        self.root.join(format!("sv{unit}"))
    }
}

impl StorageBackend for FileBackend {
    fn num_units(&self) -> usize {
        self.num_units
    }

    fn unit_len(&self) -> usize {
        self.unit_len
    }

    fn read_unit(&self, unit: usize, buf: &mut [Amplitude]) -> Result<()> {
        let io = |source| QocError::StorageIo { unit, source };
        let mut file = File::open(self.unit_path(unit)).map_err(io)?;
        file.read_exact(bytemuck::cast_slice_mut(buf)).map_err(io)?;
        Ok(())
    }

    fn write_unit(&self, unit: usize, data: &[Amplitude]) -> Result<()> {
        let io = |source| QocError::StorageIo { unit, source };
        let mut file = File::create(self.unit_path(unit)).map_err(io)?;
        file.write_all(bytemuck::cast_slice(data)).map_err(io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bytes per amplitude on disk: a pair of native-endian f64.
    const AMP_BYTES: usize = 16;

    fn pattern(unit: usize, len: usize) -> Vec<Amplitude> {
        (0..len)
            .map(|i| Amplitude::new(unit as f64, i as f64))
            .collect()
    }

    #[test]
    fn memory_backend_round_trips() {
        let backend = MemoryBackend::new(4, 8);
        for unit in 0..4 {
            backend.write_unit(unit, &pattern(unit, 8)).unwrap();
        }
        let mut buf = vec![Amplitude::ZERO; 8];
        for unit in 0..4 {
            backend.read_unit(unit, &mut buf).unwrap();
            assert_eq!(buf, pattern(unit, 8));
        }
    }

    #[test]
    fn file_backend_round_trips_and_sizes_files() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path(), 2, 4).unwrap();

        backend.write_unit(1, &pattern(1, 4)).unwrap();
        let meta = std::fs::metadata(backend.unit_path(1)).unwrap();
        assert_eq!(meta.len(), (AMP_BYTES * 4) as u64);

        let mut buf = vec![Amplitude::ZERO; 4];
        backend.read_unit(1, &mut buf).unwrap();
        assert_eq!(buf, pattern(1, 4));
    }

    #[test]
    fn missing_file_reports_unit() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path(), 2, 4).unwrap();
        let mut buf = vec![Amplitude::ZERO; 4];
        match backend.read_unit(1, &mut buf) {
            Err(QocError::StorageIo { unit: 1, .. }) => {}
            other => panic!("expected StorageIo for unit 1, got {other:?}"),
        }
    }
}
