use crossbeam_queue::ArrayQueue;

/// Recycles batch buffers between the batching loop and finished exports.
///
/// Buffers come back cleared. The pool holds a bounded number of them; extras are dropped.
#[derive(Debug)]
pub(crate) struct BufferPool<T> {
    free: ArrayQueue<Vec<T>>,
    batch_size: usize,
}

impl<T> BufferPool<T> {
    pub fn new(batch_size: usize, queue_size: usize) -> Self {
        let capacity = (queue_size / batch_size.max(1)).max(4);
        Self {
            free: ArrayQueue::new(capacity),
            batch_size,
        }
    }

    pub fn get(&self) -> Vec<T> {
        self.free
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.batch_size))
    }

    pub fn put(&self, mut buffer: Vec<T>) {
        buffer.clear();
        // full pool: let it drop
        let _ = self.free.push(buffer);
    }

    #[cfg(test)]
    pub fn idle(&self) -> usize {
        self.free.len()
    }
}
