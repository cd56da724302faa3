use std::num::NonZeroU64;

use crate::render::TransformConstants;

const MIN_SLOTS: usize = 64;

/// Uniform buffer holding one transform block per draw of the current frame.
///
/// Slots are `stride` bytes apart so each can be addressed with a dynamic
/// offset. The buffer grows by powers of two and is never shrunk.
pub(crate) struct ConstantArena {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: usize,
}

impl ConstantArena {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = aligned_stride(TransformConstants::SIZE, alignment);
        let (buffer, bind_group) = allocate(device, layout, stride, MIN_SLOTS);

        Self {
            buffer,
            bind_group,
            stride,
            capacity: MIN_SLOTS,
        }
    }

    pub fn ensure_capacity(
        &mut self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        slots: usize,
    ) {
        if slots <= self.capacity {
            return;
        }

        let capacity = slots.next_power_of_two().max(MIN_SLOTS);
        let (buffer, bind_group) = allocate(device, layout, self.stride, capacity);

        log::debug!("transform arena grown to {capacity} slots");

        self.buffer = buffer;
        self.bind_group = bind_group;
        self.capacity = capacity;
    }

    /// Writes `blocks` into consecutive slots starting at 0.
    pub fn write<'a, I>(&self, queue: &wgpu::Queue, blocks: I)
    where
        I: ExactSizeIterator<Item = &'a TransformConstants>,
    {
        let count = blocks.len();
        if count == 0 {
            return;
        }

        let stride = self.stride as usize;
        let mut staging = vec![0u8; count * stride];
        for (slot, block) in blocks.enumerate() {
            let start = slot * stride;
            let bytes = bytemuck::bytes_of(block);
            staging[start..start + bytes.len()].copy_from_slice(bytes);
        }

        queue.write_buffer(&self.buffer, 0, &staging);
    }

    #[inline]
    pub fn offset(&self, slot: usize) -> wgpu::DynamicOffset {
        (slot as u64 * self.stride) as wgpu::DynamicOffset
    }

    #[inline]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

fn allocate(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("kojeom transform arena"),
        size: stride * capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("kojeom transform bind group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(TransformConstants::SIZE),
            }),
        }],
    });

    (buffer, bind_group)
}

/// Rounds `size` up to the next multiple of `alignment`.
fn aligned_stride(size: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return size;
    }
    size.div_ceil(alignment) * alignment
}
