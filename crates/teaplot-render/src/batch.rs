//! Revision-tracked GPU vertex buffers keyed by scene node.

use ahash::AHashMap;
use bytemuck::Pod;
use wgpu::util::DeviceExt;

/// Identifies the batch of one scene node.
pub type BatchKey = u64;

pub struct GpuBatch {
    pub buffer: wgpu::Buffer,
    pub count: u32,
    revision: u64,
}

/// Vertex or instance buffers that are re-uploaded only when the owning
/// node's revision changes.
pub struct BatchCache {
    label: &'static str,
    batches: AHashMap<BatchKey, GpuBatch>,
}

impl BatchCache {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            batches: AHashMap::new(),
        }
    }

    /// Upload `data` for `key` unless `revision` is already resident.
    ///
    /// Returns `true` when a new buffer was created. Empty data removes the
    /// batch.
    pub fn upload<T: Pod>(
        &mut self,
        device: &wgpu::Device,
        key: BatchKey,
        revision: u64,
        data: &[T],
    ) -> bool {
        if self
            .batches
            .get(&key)
            .is_some_and(|batch| batch.revision == revision)
        {
            return false;
        }

        if data.is_empty() {
            self.batches.remove(&key);
            return false;
        }

        tracing::trace!("{}: uploading {} elements for node {}", self.label, data.len(), key);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(self.label),
            contents: bytemuck::cast_slice(data),
            usage: wgpu::BufferUsages::VERTEX,
        });

        self.batches.insert(
            key,
            GpuBatch {
                buffer,
                count: data.len() as u32,
                revision,
            },
        );
        true
    }

    pub fn get(&self, key: BatchKey) -> Option<&GpuBatch> {
        self.batches.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BatchKey, &GpuBatch)> {
        self.batches.iter().map(|(key, batch)| (*key, batch))
    }

    /// Drop every batch whose key fails `live`.
    pub fn retain(&mut self, mut live: impl FnMut(BatchKey) -> bool) {
        self.batches.retain(|key, _| live(*key));
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}
