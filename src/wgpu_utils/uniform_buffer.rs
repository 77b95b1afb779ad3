// src/wgpu_utils/uniform_buffer.rs - Typed uniform and array buffers
use std::marker::PhantomData;
use wgpu::util::DeviceExt;

fn short_type_name<T>() -> &'static str {
    let type_name = std::any::type_name::<T>();
    let pos = type_name.rfind(':').unwrap_or(0);
    if pos > 0 {
        &type_name[(pos + 1)..]
    } else {
        type_name
    }
}

/// Typed wrapper around a single-value uniform buffer
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    previous_content: Vec<u8>,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    /// Create a new uniform buffer
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("UniformBuffer: {}", short_type_name::<Content>())),
            size: std::mem::size_of::<Content>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        UniformBuffer {
            buffer,
            content_type: PhantomData,
            previous_content: Vec::new(),
        }
    }

    /// Create buffer with initial data
    pub fn new_with_data(device: &wgpu::Device, initial_content: &Content) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("UniformBuffer: {}", short_type_name::<Content>())),
            contents: bytemuck::bytes_of(initial_content),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        UniformBuffer {
            buffer,
            content_type: PhantomData,
            previous_content: bytemuck::bytes_of(initial_content).to_vec(),
        }
    }

    /// Update buffer content, skipping the write when nothing changed
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: Content) {
        let new_content = bytemuck::bytes_of(&content);
        if self.previous_content == new_content {
            return;
        }
        queue.write_buffer(&self.buffer, 0, new_content);
        self.previous_content = new_content.to_vec();
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

/// Fixed-capacity buffer holding a tightly packed array of `Content`
pub struct ArrayBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    len: usize,
}

impl<Content: bytemuck::Pod> ArrayBuffer<Content> {
    /// Create an array buffer initialised with `data`
    ///
    /// `COPY_DST` is always added so the contents can be re-uploaded.
    pub fn new_with_data(
        device: &wgpu::Device,
        data: &[Content],
        usage: wgpu::BufferUsages,
        label: &str,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} <{}>", label, short_type_name::<Content>())),
            contents: bytemuck::cast_slice(data),
            usage: usage | wgpu::BufferUsages::COPY_DST,
        });

        ArrayBuffer {
            buffer,
            content_type: PhantomData,
            len: data.len(),
        }
    }

    /// Create a mappable buffer for reading back `len` elements
    pub fn new_staging(device: &wgpu::Device, len: usize) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("Staging <{}>", short_type_name::<Content>())),
            size: Self::byte_size_for(len),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        ArrayBuffer {
            buffer,
            content_type: PhantomData,
            len,
        }
    }

    /// Overwrite the array contents
    ///
    /// # Panics
    /// Panics if `data` does not have exactly `len()` elements
    pub fn update_data(&self, queue: &wgpu::Queue, data: &[Content]) {
        assert_eq!(data.len(), self.len, "array buffer length is fixed");
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the packed contents in bytes
    pub fn byte_size(&self) -> wgpu::BufferAddress {
        Self::byte_size_for(self.len)
    }

    fn byte_size_for(len: usize) -> wgpu::BufferAddress {
        (len * std::mem::size_of::<Content>()) as wgpu::BufferAddress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClothUniforms;

    #[test]
    fn short_type_name_strips_module_path() {
        assert_eq!(short_type_name::<ClothUniforms>(), "ClothUniforms");
        assert_eq!(short_type_name::<u32>(), "u32");
    }
}
