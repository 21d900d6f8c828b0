use parking_lot::Mutex;

/// Multi-producer append buffer for parallel collision stages.
///
/// Workers push into per-thread shards while a parallel-for is running; once
/// the stage completes (rayon's join acts as the barrier), the owner drains
/// every shard into a single exact-size array. This is the "count, then
/// allocate, then drain" compaction pattern: the output is sized from the
/// final count, so no resizing happens while producers are live.
pub struct ShardedCollector<T> {
    shards: Vec<Mutex<Vec<T>>>,
}

impl<T> ShardedCollector<T> {
    pub fn new(shard_count: usize) -> Self {
        let shard_count = shard_count.max(1);
        Self {
            shards: (0..shard_count).map(|_| Mutex::new(Vec::new())).collect(),
        }
    }

    /// A collector with one shard per worker thread of the global pool.
    pub fn for_worker_threads() -> Self {
        #[cfg(feature = "parallel")]
        {
            Self::new(rayon::current_num_threads())
        }
        #[cfg(not(feature = "parallel"))]
        {
            Self::new(1)
        }
    }

    pub fn push(&self, value: T) {
        self.shards[self.shard_index()].lock().push(value);
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the collector, compacting all shards into one array.
    ///
    /// Must only be called after every producer has finished; taking `self`
    /// by value lets the borrow checker enforce that for the parallel stages.
    pub fn drain(self) -> Vec<T> {
        let shards: Vec<Vec<T>> = self
            .shards
            .into_iter()
            .map(|shard| shard.into_inner())
            .collect();
        let total: usize = shards.iter().map(Vec::len).sum();
        let mut out = Vec::with_capacity(total);
        for shard in shards {
            out.extend(shard);
        }
        out
    }

    fn shard_index(&self) -> usize {
        #[cfg(feature = "parallel")]
        {
            rayon::current_thread_index().unwrap_or(0) % self.shards.len()
        }
        #[cfg(not(feature = "parallel"))]
        {
            0
        }
    }
}
