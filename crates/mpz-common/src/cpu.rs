//! CPU backend shim.

use std::sync::atomic::{AtomicUsize, Ordering};

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "force-st")] {
        pub use st::SingleThreadedBackend as CpuBackend;
    } else if #[cfg(feature = "rayon")] {
        pub use rayon_backend::RayonBackend as CpuBackend;
    } else {
        pub use st::SingleThreadedBackend as CpuBackend;
    }
}

/// Returns the number of worker threads available to the CPU backend.
pub fn default_parallelism() -> usize {
    cfg_if! {
        if #[cfg(all(feature = "rayon", not(feature = "force-st")))] {
            rayon::current_num_threads()
        } else {
            1
        }
    }
}

/// A load-sensing fork/join pool.
///
/// Recursive work asks the pool whether it may fork. A fork is granted only while
/// fewer than `parallelism - 1` forks are in flight, otherwise the caller runs both
/// halves inline on its own thread. This keeps nested recursion from flooding the
/// worker threads with tasks that are too small to pay for themselves.
#[derive(Debug)]
pub struct CpuPool {
    parallelism: usize,
    active: AtomicUsize,
}

impl CpuPool {
    /// Creates a new pool.
    ///
    /// # Arguments
    ///
    /// * `parallelism` - Maximum number of threads the pool may occupy, clamped to at least 1.
    pub fn new(parallelism: usize) -> Self {
        Self {
            parallelism: parallelism.max(1),
            active: AtomicUsize::new(0),
        }
    }

    /// Returns the maximum number of threads the pool may occupy.
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Returns the number of forks currently in flight.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Attempts to reserve a fork.
    ///
    /// Returns `None` if the pool is saturated. The reservation is released when
    /// the returned permit is dropped.
    pub fn try_spawn(&self) -> Option<Permit<'_>> {
        let limit = self.parallelism - 1;
        self.active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |active| {
                (active < limit).then_some(active + 1)
            })
            .ok()
            .map(|_| Permit { pool: self })
    }

    /// Runs `a` and `b`, potentially in parallel.
    ///
    /// The closures are run in parallel only if a fork can be reserved, otherwise
    /// they are run sequentially on the calling thread.
    pub fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        cfg_if! {
            if #[cfg(all(feature = "rayon", not(feature = "force-st")))] {
                if let Some(_permit) = self.try_spawn() {
                    return rayon::join(a, b);
                }
                (a(), b())
            } else {
                (a(), b())
            }
        }
    }
}

impl Default for CpuPool {
    fn default() -> Self {
        Self::new(default_parallelism())
    }
}

/// A reserved fork in a [`CpuPool`].
#[derive(Debug)]
pub struct Permit<'a> {
    pool: &'a CpuPool,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.pool.active.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(any(feature = "force-st", not(feature = "rayon")))]
mod st {
    /// A single-threaded CPU backend.
    #[derive(Debug)]
    pub struct SingleThreadedBackend;

    impl SingleThreadedBackend {
        /// Executes a closure on the CPU backend.
        #[inline]
        pub async fn blocking<F, R>(f: F) -> R
        where
            F: FnOnce() -> R + Send + 'static,
            R: Send + 'static,
        {
            f()
        }
    }

}

#[cfg(all(feature = "rayon", not(feature = "force-st")))]
mod rayon_backend {
    use futures::channel::oneshot;

    /// A Rayon CPU backend.
    #[derive(Debug)]
    pub struct RayonBackend;

    impl RayonBackend {
        /// Executes a closure on the CPU backend.
        pub async fn blocking<F, R>(f: F) -> R
        where
            F: FnOnce() -> R + Send + 'static,
            R: Send + 'static,
        {
            let (sender, receiver) = oneshot::channel();
            rayon::spawn(move || {
                _ = sender.send(f());
            });
            receiver.await.expect("worker thread does not drop channel")
        }
    }

}
