//! Compiling patterns and caching what was compiled.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::cache::LruCache;
use crate::error::{CompileError, NotSupportedKind, not_supported};
use crate::groups::{GroupRegistry, SlotTable};
use crate::host::{FancyHost, HostMatcher};
use crate::options::{CompileFlags, RegexOptions};
use crate::pattern::CompiledPattern;
use crate::rewrite;
use crate::syntax::escape::resolve_numeric_escapes;
use crate::syntax;
use crate::syntax::token::Token;
use crate::syntax::width;

/// Tunables for an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Compiled patterns kept by the engine.
    pub cache_capacity: usize,
    /// Host programs kept by the default host, including recovery fragments.
    pub host_cache_capacity: usize,
    /// Deadline for capture recovery in one match call.
    pub match_timeout: Option<Duration>,
    /// Backtracking steps the host may take before giving up.
    pub backtrack_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 15,
            host_cache_capacity: 256,
            match_timeout: None,
            backtrack_limit: 1_000_000,
        }
    }
}

impl EngineConfig {
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_host_cache_capacity(mut self, capacity: usize) -> Self {
        self.host_cache_capacity = capacity;
        self
    }

    pub fn with_match_timeout(mut self, timeout: Duration) -> Self {
        self.match_timeout = Some(timeout);
        self
    }

    pub fn with_backtrack_limit(mut self, limit: usize) -> Self {
        self.backtrack_limit = limit;
        self
    }
}

/// Everything `compile` produces for one (pattern, options) pair.
///
/// Shared read-only between every [`CompiledPattern`] made from it.
#[derive(Debug)]
pub(crate) struct Program {
    pub source: String,
    pub host_pattern: String,
    /// Rewritten token tree; offsets index into `host_pattern`.
    pub tokens: Vec<Token>,
    pub flags: CompileFlags,
    pub registry: GroupRegistry,
    pub slots: SlotTable,
    /// `(slot number, name)` for every slot in slot order.
    pub group_names: Vec<(usize, String)>,
    /// Characters past a match's end the pattern's assertions can read, or
    /// `None` without a bound. Recovery keeps that much text past a
    /// capture's end.
    pub reach: Option<usize>,
}

impl Program {
    fn build<H: HostMatcher>(pattern: &str, options: RegexOptions, host: &H) -> Result<Self, CompileError> {
        let mut tokens = syntax::tokenize(pattern, options)?;
        let mut registry = GroupRegistry::build(&mut tokens);
        let slots = SlotTable::resolve(&mut registry)?;
        resolve_numeric_escapes(&mut tokens, &slots)?;
        let flags = rewrite::rewrite(&mut tokens, &mut registry, &slots, options)?;
        syntax::layout(&mut tokens, 0);
        let host_pattern = syntax::serialize(&tokens);
        record_host_spans(&tokens, &mut registry);

        host.validate(&host_pattern)
            .map_err(|e| not_supported(NotSupportedKind::HostRejected(e.0), 0))?;

        let group_names = slots
            .numbers()
            .iter()
            .map(|&n| (n, slots.name_for_number(n).unwrap_or_else(|| n.to_string())))
            .collect();
        let reach = width::reach(&tokens);
        Ok(Self {
            source: pattern.to_string(),
            host_pattern,
            tokens,
            flags,
            registry,
            slots,
            group_names,
            reach,
        })
    }
}

fn record_host_spans(tokens: &[Token], registry: &mut GroupRegistry) {
    for token in tokens {
        if let Some(group) = token.group.and_then(|raw| registry.get_mut(raw)) {
            group.host_span = token.offset..token.end();
        }
        record_host_spans(&token.children, registry);
    }
}

/// Cache hit and miss counts for an [`Engine`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
}

#[derive(Debug)]
struct ProgramCache {
    entries: LruCache<(String, RegexOptions), Arc<Program>>,
    hits: u64,
    misses: u64,
}

/// Compiles patterns against one host matcher and keeps the most recently
/// used results.
///
/// An engine is `Sync`; compiled patterns can be shared across threads.
#[derive(Debug)]
pub struct Engine<H: HostMatcher = FancyHost> {
    host: Arc<H>,
    config: EngineConfig,
    programs: Mutex<ProgramCache>,
}

impl Engine<FancyHost> {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let host = FancyHost::new(config.host_cache_capacity, config.backtrack_limit);
        Self::with_host(host, config)
    }
}

impl Default for Engine<FancyHost> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HostMatcher> Engine<H> {
    pub fn with_host(host: H, config: EngineConfig) -> Self {
        Self {
            host: Arc::new(host),
            config,
            programs: Mutex::new(ProgramCache {
                entries: LruCache::new(config.cache_capacity),
                hits: 0,
                misses: 0,
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compile `pattern`, reusing an earlier result for the same pattern and
    /// options when one is cached.
    pub fn compile(&self, pattern: &str, options: RegexOptions) -> Result<CompiledPattern<H>, CompileError> {
        let key = (pattern.to_string(), options);
        {
            let mut cache = self.lock();
            if let Some(program) = cache.entries.get(&key).cloned() {
                cache.hits += 1;
                return Ok(self.wrap(program));
            }
            cache.misses += 1;
        }
        // Built outside the lock; a concurrent compile of the same key just
        // builds it twice.
        let program = Arc::new(Program::build(pattern, options, self.host.as_ref())?);
        self.lock().entries.insert(key, Arc::clone(&program));
        Ok(self.wrap(program))
    }

    pub fn cache_stats(&self) -> CacheStats {
        let cache = self.lock();
        CacheStats {
            hits: cache.hits,
            misses: cache.misses,
            len: cache.entries.len(),
        }
    }

    /// Drop every cached pattern. Patterns already handed out keep working.
    pub fn clear_cache(&self) {
        self.lock().entries.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProgramCache> {
        self.programs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wrap(&self, program: Arc<Program>) -> CompiledPattern<H> {
        CompiledPattern::new(program, Arc::clone(&self.host), self.config.match_timeout)
    }
}
