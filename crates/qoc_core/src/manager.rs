//! Chunked state-vector storage manager.
//!
//! The manager owns the primary chunk buffer of `2^NP` amplitudes and a
//! [`StorageBackend`] holding `2^(NQ-NL)` units of `2^NL` amplitudes. For a
//! sub-circuit touching a given qubit set, [`SvManager::load_sv`] gathers
//! the exact units whose contents make up chunk `chunk_idx`, positioned so
//! the sub-circuit's global qubits form the upper bits of the chunk index;
//! [`SvManager::store_sv`] scatters the evolved chunk back to the same
//! units. Across all chunk indices of one sub-circuit the unit sets are
//! disjoint and cover the whole store exactly once.

use log::debug;
use qoc_common::Amplitude;

use crate::error::{QocError, Result};
use crate::executor::ParallelExecutor;
use crate::indexing::indexes;
use crate::storage::StorageBackend;

/// State-vector data access manager.
pub struct SvManager<B: StorageBackend> {
    num_qubits: usize,
    num_primary: usize,
    num_local: usize,
    chunk_idx: usize,
    chunk: Vec<Amplitude>,
    backend: B,
    is_parallel: bool,
    executor: ParallelExecutor,
}

impl<B: StorageBackend> SvManager<B> {
    /// Creates a manager over `backend`.
    ///
    /// # Arguments
    ///
    /// * `num_qubits` - Total qubit count `Q`
    /// * `num_primary` - Qubits resident in the compute unit (`NP`)
    /// * `num_local` - Qubits per storage unit (`NL`)
    /// * `is_parallel` - Fan unit I/O out over the worker pool
    /// * `backend` - Backing store; its geometry must match `(Q, NL)`
    pub fn new(
        num_qubits: usize,
        num_primary: usize,
        num_local: usize,
        is_parallel: bool,
        backend: B,
    ) -> Result<Self> {
        if num_local > num_primary || num_primary > num_qubits || num_qubits > 64 {
            return Err(QocError::Configuration(format!(
                "need num_local <= num_primary <= num_qubits <= 64, \
                 got ({num_qubits}, {num_primary}, {num_local})"
            )));
        }
        if backend.num_units() != 1 << (num_qubits - num_local)
            || backend.unit_len() != 1 << num_local
        {
            return Err(QocError::Configuration(format!(
                "backend holds {} units of {} amplitudes, expected {} of {}",
                backend.num_units(),
                backend.unit_len(),
                1usize << (num_qubits - num_local),
                1usize << num_local
            )));
        }

        Ok(Self {
            num_qubits,
            num_primary,
            num_local,
            chunk_idx: 0,
            chunk: vec![Amplitude::ZERO; 1 << num_primary],
            backend,
            is_parallel,
            executor: ParallelExecutor::new(),
        })
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn num_primary(&self) -> usize {
        self.num_primary
    }

    pub fn num_local(&self) -> usize {
        self.num_local
    }

    /// Chunks per sub-circuit: `2^(Q-NP)`.
    pub fn num_chunks(&self) -> usize {
        1 << (self.num_qubits - self.num_primary)
    }

    pub fn chunk_idx(&self) -> usize {
        self.chunk_idx
    }

    /// Selects which chunk of the state vector subsequent load/store calls
    /// address.
    pub fn set_chunk_idx(&mut self, idx: usize) -> Result<()> {
        if idx >= self.num_chunks() {
            return Err(QocError::ChunkMisaligned {
                isub: idx,
                max: self.num_chunks(),
            });
        }
        self.chunk_idx = idx;
        Ok(())
    }

    /// The primary chunk buffer.
    pub fn chunk(&self) -> &[Amplitude] {
        &self.chunk
    }

    /// Replaces the chunk buffer, e.g. with a kernel's output.
    pub fn set_chunk(&mut self, chunk: Vec<Amplitude>) -> Result<()> {
        if chunk.len() != 1 << self.num_primary {
            return Err(QocError::Configuration(format!(
                "chunk of {} amplitudes does not fit a {}-qubit primary register",
                chunk.len(),
                self.num_primary
            )));
        }
        self.chunk = chunk;
        Ok(())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Creates all storage units, writing the |0...0> basis state.
    pub fn initialize(&mut self) -> Result<()> {
        let backend = &self.backend;
        let unit_len = backend.unit_len();
        let init_one = |unit: usize| -> Result<()> {
            let mut su = vec![Amplitude::ZERO; unit_len];
            if unit == 0 {
                su[0] = Amplitude::ONE;
            }
            backend.write_unit(unit, &su)
        };

        let units: Vec<usize> = (0..backend.num_units()).collect();
        if self.is_parallel {
            self.executor.execute(units, init_one)
        } else {
            units.into_iter().try_for_each(init_one)
        }
    }

    /// Storage-unit ids composing the current chunk, ordered by chunk slice.
    ///
    /// Slice `isub` of the chunk (amplitudes `[isub*2^NL, (isub+1)*2^NL)`)
    /// corresponds to unit `ids[isub]`. The layout puts the touched global
    /// qubits in the upper bits of the chunk index: slices enumerate the
    /// `2^LG` subsets of the global qubit bits within each primary group.
    fn unit_ids(&self, touched: &[usize]) -> Result<Vec<usize>> {
        if touched.len() < self.num_local {
            return Err(QocError::InsufficientTouchedQubits {
                got: touched.len(),
                need: self.num_local,
            });
        }

        let mut global: Vec<usize> = touched
            .iter()
            .filter(|&&q| q >= self.num_local)
            .map(|&q| q - self.num_local)
            .collect();
        global.sort_unstable();

        let slots_log = self.num_primary - self.num_local;
        let lg = global.len();
        if lg > slots_log {
            return Err(QocError::PartitioningOverflow {
                needed: lg + self.num_local,
                available: self.num_primary,
            });
        }

        // Primary groups per chunk and the group window of this chunk.
        let num_prim_grps = 1usize << (slots_log - lg);
        let start_group = self.chunk_idx * num_prim_grps;
        let slots = 1usize << slots_log;

        let mut ids = vec![0usize; slots];
        for gid in start_group..start_group + num_prim_grps {
            let inds = indexes(&global, gid as u64);
            for (idx, &ind) in inds.iter().enumerate() {
                let isub = ((gid - start_group) << lg) + idx;
                if isub >= slots {
                    return Err(QocError::ChunkMisaligned { isub, max: slots });
                }
                ids[isub] = ind as usize;
            }
        }
        Ok(ids)
    }

    /// Gathers the current chunk from storage.
    ///
    /// # Arguments
    ///
    /// * `touched` - The sub-circuit's touched qubit set; must contain at
    ///   least the `NL` local qubits
    ///
    /// # Returns
    ///
    /// The filled chunk buffer: a pure rearrangement of the gathered units.
    pub fn load_sv(&mut self, touched: &[usize]) -> Result<&[Amplitude]> {
        let ids = self.unit_ids(touched)?;
        let unit_len = self.backend.unit_len();

        let backend = &self.backend;
        let executor = self.executor;
        let tasks: Vec<(usize, &mut [Amplitude])> =
            ids.into_iter().zip(self.chunk.chunks_mut(unit_len)).collect();

        if self.is_parallel {
            executor.execute(tasks, |(unit, slice)| backend.read_unit(unit, slice))?;
        } else {
            for (unit, slice) in tasks {
                backend.read_unit(unit, slice)?;
            }
        }

        debug!(
            "loaded chunk {} of {} for touched qubits {:?}",
            self.chunk_idx,
            self.num_chunks(),
            touched
        );
        Ok(&self.chunk)
    }

    /// Scatters the current chunk back to the same units a load at this
    /// `chunk_idx` gathered from.
    pub fn store_sv(&mut self, touched: &[usize]) -> Result<()> {
        let ids = self.unit_ids(touched)?;
        let unit_len = self.backend.unit_len();

        let backend = &self.backend;
        let executor = self.executor;
        let tasks: Vec<(usize, &[Amplitude])> =
            ids.into_iter().zip(self.chunk.chunks(unit_len)).collect();

        if self.is_parallel {
            executor.execute(tasks, |(unit, slice)| backend.write_unit(unit, slice))?;
        } else {
            for (unit, slice) in tasks {
                backend.write_unit(unit, slice)?;
            }
        }

        debug!(
            "stored chunk {} of {} for touched qubits {:?}",
            self.chunk_idx,
            self.num_chunks(),
            touched
        );
        Ok(())
    }

    /// Reads the whole store back as one state vector in natural basis
    /// order. Intended for result extraction and verification after a run.
    pub fn gather_full_sv(&self) -> Result<Vec<Amplitude>> {
        let unit_len = self.backend.unit_len();
        let mut sv = vec![Amplitude::ZERO; 1 << self.num_qubits];
        for (unit, slice) in sv.chunks_mut(unit_len).enumerate() {
            self.backend.read_unit(unit, slice)?;
        }
        Ok(sv)
    }
}
