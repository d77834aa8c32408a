//! Construction options for the codec

/// Which binary extension field the codec computes in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldChoice {
    /// GF(2^8) when `K + M <= 256`, otherwise GF(2^16)
    #[default]
    Auto,
    /// Force GF(2^8)
    Gf8,
    /// Force GF(2^16)
    Gf16,
}

/// Configuration for a codec instance
///
/// None of these knobs change the bytes a codec produces; they only affect
/// field selection limits and how the work is scheduled.
#[derive(Debug, Clone)]
pub struct CodecOptions {
    /// Field variant selection
    pub field: FieldChoice,
    /// Number of threads for computation (0 = ambient rayon pool)
    pub threads: usize,
    /// Whether to split work across threads (false = single-threaded everything)
    pub parallel: bool,
    /// Target transform workspace per parallel task, in bytes
    pub stripe_bytes: usize,
}

/// Default workspace budget for one stripe of work
pub const DEFAULT_STRIPE_BYTES: usize = 4 << 20;

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            field: FieldChoice::Auto,
            threads: 0,
            parallel: true,
            stripe_bytes: DEFAULT_STRIPE_BYTES,
        }
    }
}

impl CodecOptions {
    pub fn new(threads: usize, parallel: bool) -> Self {
        Self {
            threads,
            parallel,
            ..Self::default()
        }
    }

    pub fn with_field(mut self, field: FieldChoice) -> Self {
        self.field = field;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_stripe_bytes(mut self, stripe_bytes: usize) -> Self {
        self.stripe_bytes = stripe_bytes;
        self
    }

    /// Get effective thread count (auto-detect if 0)
    pub fn effective_threads(&self) -> usize {
        match (self.parallel, self.threads) {
            (false, _) => 1, // Sequential mode always uses single thread
            (true, 0) => rayon::current_num_threads(),
            (true, n) => n,
        }
    }
}
