//! Type resolution: maps a structured type reference to a user-defined target
//! and an arity, or marks it foreign.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use indexmap::IndexSet;

use crate::ast::{simple_name, ClassDecl, TypeRef};
use crate::config::{ResolverConfig, UnknownTypePolicy};
use crate::error::{AnalysisError, Result};

const PRIMITIVES: &[&str] = &[
    "byte", "short", "int", "long", "float", "double", "boolean", "char", "void", "var",
];

const FOREIGN_TYPES: &[&str] = &[
    "String", "Object", "Integer", "Long", "Short", "Byte", "Double", "Float", "Boolean",
    "Character", "Number", "Void", "CharSequence", "StringBuilder", "StringBuffer",
    "BigDecimal", "BigInteger", "Class", "Enum", "Record", "Throwable", "Exception",
    "RuntimeException", "Error", "Thread", "Runnable", "Callable", "Comparable", "Comparator",
    "Iterator", "Serializable", "Cloneable", "AutoCloseable", "Closeable", "Date", "Instant",
    "Duration", "LocalDate", "LocalTime", "LocalDateTime", "ZonedDateTime", "UUID", "Path",
    "File", "Pattern", "Stream", "Function", "BiFunction", "Supplier", "Consumer",
    "BiConsumer", "Predicate", "Future", "CompletableFuture", "Random", "Scanner", "Math",
    "System", "Objects", "Arrays", "Collections",
];

const LIST_TYPES: &[&str] = &[
    "List", "ArrayList", "LinkedList", "Collection", "Iterable", "Queue", "Deque",
    "ArrayDeque", "PriorityQueue", "Stack", "Vector", "CopyOnWriteArrayList",
    "BlockingQueue", "LinkedBlockingQueue",
];

const SET_TYPES: &[&str] = &[
    "Set", "HashSet", "TreeSet", "LinkedHashSet", "SortedSet", "NavigableSet", "EnumSet",
    "CopyOnWriteArraySet",
];

const MAP_TYPES: &[&str] = &[
    "Map", "HashMap", "TreeMap", "LinkedHashMap", "SortedMap", "NavigableMap",
    "ConcurrentMap", "ConcurrentHashMap", "Hashtable", "EnumMap", "WeakHashMap",
    "IdentityHashMap",
];

const OPTIONAL_TYPES: &[&str] = &["Optional"];

/// Shape of a resolved member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Scalar,
    Optional,
    List,
    Set,
    Map,
}

impl Arity {
    pub fn is_collection(&self) -> bool {
        matches!(self, Arity::List | Arity::Set | Arity::Map)
    }
}

/// Outcome of resolving one type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Primitive or library type; never produces a relationship.
    Foreign,
    Scalar(String),
    Optional(String),
    List(String),
    Set(String),
    /// Every target reachable on each side; at least one side is non-empty.
    Map {
        key: Vec<String>,
        value: Vec<String>,
    },
}

impl Resolution {
    pub fn is_foreign(&self) -> bool {
        matches!(self, Resolution::Foreign)
    }

    pub fn arity(&self) -> Option<Arity> {
        match self {
            Resolution::Foreign => None,
            Resolution::Scalar(_) => Some(Arity::Scalar),
            Resolution::Optional(_) => Some(Arity::Optional),
            Resolution::List(_) => Some(Arity::List),
            Resolution::Set(_) => Some(Arity::Set),
            Resolution::Map { .. } => Some(Arity::Map),
        }
    }

    /// User-defined targets, key side before value side.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Resolution::Foreign => Vec::new(),
            Resolution::Scalar(t)
            | Resolution::Optional(t)
            | Resolution::List(t)
            | Resolution::Set(t) => vec![t.as_str()],
            Resolution::Map { key, value } => key
                .iter()
                .chain(value.iter())
                .map(String::as_str)
                .collect(),
        }
    }

    /// The single target of a non-map resolution.
    fn primary_target(&self) -> Option<&str> {
        match self {
            Resolution::Map { .. } => None,
            other => other.targets().into_iter().next(),
        }
    }

    fn map(key: Vec<String>, value: Vec<String>) -> Self {
        if key.is_empty() && value.is_empty() {
            Resolution::Foreign
        } else {
            Resolution::Map { key, value }
        }
    }
}

/// Names known to be user-defined: declared entities plus any extra entries
/// supplied by configuration or front-end imports.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    qualified: IndexSet<String>,
    by_simple: HashMap<String, String>,
    /// Simple names brought in by imports under a foreign prefix.
    foreign_imports: HashSet<String>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table for one run. Declarations come first so that an
    /// ambiguous simple name resolves to the first declared entity.
    pub fn from_declarations(decls: &[ClassDecl], config: &ResolverConfig) -> Self {
        let mut table = Self::new();
        for decl in decls {
            table.insert(&decl.name);
        }
        for name in &config.user_types {
            table.insert(name);
        }
        for decl in decls {
            for import in &decl.imports {
                let foreign = config
                    .foreign_prefixes
                    .iter()
                    .any(|p| import.starts_with(p.as_str()));
                if import.ends_with('*') {
                    continue;
                }
                if foreign {
                    table
                        .foreign_imports
                        .insert(simple_name(import).to_string());
                } else {
                    table.insert(import);
                }
            }
        }
        table
    }

    pub fn insert(&mut self, qualified: &str) {
        if self.qualified.insert(qualified.to_string()) {
            self.by_simple
                .entry(simple_name(qualified).to_string())
                .or_insert_with(|| qualified.to_string());
        }
    }

    /// Qualified name for a reference written as `name`.
    ///
    /// A partially qualified name such as `House.Door` matches the first
    /// entry ending in `.House.Door`.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        if let Some(found) = self.qualified.get(name) {
            return Some(found.as_str());
        }
        if name.contains('.') {
            let suffix = format!(".{name}");
            return self
                .qualified
                .iter()
                .find(|q| q.ends_with(&suffix))
                .map(String::as_str);
        }
        self.by_simple.get(name).map(String::as_str)
    }

    /// Whether `simple` was imported from a foreign package.
    pub fn is_foreign_import(&self, simple: &str) -> bool {
        self.foreign_imports.contains(simple)
    }

    pub fn len(&self) -> usize {
        self.qualified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.qualified.is_empty()
    }
}

/// Cached outcome: the `Err` side holds the innermost unresolved name.
type Slot = std::result::Result<Resolution, String>;

/// Memoizing type resolver. One instance per analysis run; shared read-mostly
/// between the per-entity classification tasks.
pub struct TypeResolver {
    table: TypeTable,
    foreign: HashSet<String>,
    lists: HashSet<String>,
    sets: HashSet<String>,
    maps: HashSet<String>,
    optionals: HashSet<String>,
    foreign_prefixes: Vec<String>,
    strict: bool,
    unknown: UnknownTypePolicy,
    cache: DashMap<String, Slot>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

fn merged(builtin: &[&str], extra: &[String]) -> HashSet<String> {
    builtin
        .iter()
        .map(|s| s.to_string())
        .chain(extra.iter().cloned())
        .collect()
}

impl TypeResolver {
    pub fn new(table: TypeTable, config: &ResolverConfig) -> Self {
        Self {
            table,
            foreign: merged(FOREIGN_TYPES, &config.foreign_types),
            lists: merged(LIST_TYPES, &config.list_types),
            sets: merged(SET_TYPES, &config.set_types),
            maps: merged(MAP_TYPES, &config.map_types),
            optionals: merged(OPTIONAL_TYPES, &config.optional_types),
            foreign_prefixes: config.foreign_prefixes.clone(),
            strict: config.fail_on_unresolved_type,
            unknown: config.unknown_types,
            cache: DashMap::new(),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn table(&self) -> &TypeTable {
        &self.table
    }

    /// Resolve `ty` as referenced from `entity`.
    ///
    /// Only fails in strict mode, for a type that is neither user-defined nor
    /// known foreign. Without strict mode unknown types follow the
    /// configured [`UnknownTypePolicy`].
    pub fn resolve(&self, ty: &TypeRef, entity: &str) -> Result<Resolution> {
        self.lookup(ty)
            .map_err(|type_name| AnalysisError::UnresolvedType {
                entity: entity.to_string(),
                type_name,
            })
    }

    /// `(hits, misses)` of the memo cache so far.
    pub fn cache_stats(&self) -> (usize, usize) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    fn lookup(&self, ty: &TypeRef) -> Slot {
        let key = ty.signature();
        if let Some(slot) = self.cache.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return slot.value().clone();
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        // Computed outside any shard lock; a racing insert of the same key
        // stores an identical value.
        let slot = self.resolve_uncached(ty);
        self.cache.entry(key).or_insert(slot).value().clone()
    }

    fn resolve_uncached(&self, ty: &TypeRef) -> Slot {
        match ty {
            TypeRef::Array(element) => Ok(match self.lookup(element)? {
                Resolution::Foreign => Resolution::Foreign,
                map @ Resolution::Map { .. } => map,
                other => match other.primary_target() {
                    Some(t) => Resolution::List(t.to_string()),
                    None => Resolution::Foreign,
                },
            }),
            TypeRef::Named { name, args } => self.resolve_named(name, args),
        }
    }

    fn resolve_named(&self, name: &str, args: &[TypeRef]) -> Slot {
        let simple = simple_name(name);
        if PRIMITIVES.contains(&name) {
            return Ok(Resolution::Foreign);
        }
        if let Some(qualified) = self.table.lookup(name) {
            return Ok(Resolution::Scalar(qualified.to_string()));
        }

        if self.maps.contains(simple) {
            if args.len() != 2 {
                return Ok(Resolution::Foreign);
            }
            let side = |ty: &TypeRef| -> std::result::Result<Vec<String>, String> {
                Ok(self
                    .lookup(ty)?
                    .targets()
                    .into_iter()
                    .map(str::to_string)
                    .collect())
            };
            return Ok(Resolution::map(side(&args[0])?, side(&args[1])?));
        }

        let wrap: Option<fn(String) -> Resolution> = if self.lists.contains(simple) {
            Some(Resolution::List)
        } else if self.sets.contains(simple) {
            Some(Resolution::Set)
        } else if self.optionals.contains(simple) {
            Some(Resolution::Optional)
        } else {
            None
        };
        if let Some(wrap) = wrap {
            let Some(element) = args.last() else {
                return Ok(Resolution::Foreign);
            };
            return Ok(match self.lookup(element)? {
                Resolution::Foreign => Resolution::Foreign,
                map @ Resolution::Map { .. } => map,
                // Optional<List<T>> keeps the collection
                inner @ (Resolution::List(_) | Resolution::Set(_))
                    if self.optionals.contains(simple) =>
                {
                    inner
                }
                inner => match inner.primary_target() {
                    Some(t) => wrap(t.to_string()),
                    None => Resolution::Foreign,
                },
            });
        }

        if self.is_foreign(name) {
            return Ok(Resolution::Foreign);
        }

        if self.strict {
            return Err(name.to_string());
        }
        match self.unknown {
            UnknownTypePolicy::Foreign => Ok(Resolution::Foreign),
            UnknownTypePolicy::External => Ok(Resolution::Scalar(name.to_string())),
        }
    }

    fn is_container(&self, simple: &str) -> bool {
        self.lists.contains(simple)
            || self.sets.contains(simple)
            || self.maps.contains(simple)
            || self.optionals.contains(simple)
    }

    fn is_foreign(&self, name: &str) -> bool {
        // `Map.Entry`, `Thread.State`: nested in a library type
        if let Some((outer, _)) = name.split_once('.') {
            if self.is_container(outer) || self.is_foreign(outer) {
                return true;
            }
        }
        self.foreign.contains(name)
            || self.table.is_foreign_import(name)
            || self
                .foreign_prefixes
                .iter()
                .any(|p| name.starts_with(p.as_str()))
            // Single-letter names are type parameters (`T`, `E`).
            || (name.len() == 1 && name.chars().all(|c| c.is_ascii_uppercase()))
    }
}
