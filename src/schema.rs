//! The schema value at the center of the crate: a typed pair of read and
//! write functions, plus the transform and lazy combinators that make
//! schemas composable and self-referential.

use crate::{
    envelope::Serialized,
    error::{
        Result,
        ensure,
    },
    reader::Reader,
    value::{
        FromValue,
        IntoValue,
        Value,
    },
    writer::{
        Writer,
        WriterOptions,
    },
};
use once_cell::sync::OnceCell;
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};
use tracing::trace;


type ReadFn<T> = dyn Fn(&mut Reader) -> Result<T> + Send + Sync;
type WriteFn<I> = dyn Fn(&I, &mut Writer) -> Result<()> + Send + Sync;
type SizeFn<I> = dyn Fn(&I) -> Option<usize> + Send + Sync;
type ValidateFn<I> = dyn Fn(&I) -> Result<()> + Send + Sync;
type SerializeFn<I> = dyn Fn(&I, WriterOptions) -> Result<Vec<u8>> + Send + Sync;

/// A BCS schema: how to read a `T` out of bytes, how to write an `I` into
/// bytes, a display name, an optional exact-size hint, and an optional
/// input validator.
///
/// `T` is the output type (`read`/`parse` yield it), `I` the input type
/// (`write`/`serialize` accept it); for most schemas they coincide.
/// Schemas are immutable once built, cheap to clone, and safe to share
/// across threads.
pub struct BcsType<T: 'static, I: 'static = T> {
    name: String,
    read: Arc<ReadFn<T>>,
    write: Arc<WriteFn<I>>,
    serialized_size: Option<Arc<SizeFn<I>>>,
    validate: Option<Arc<ValidateFn<I>>>,
    serialize: Option<Arc<SerializeFn<I>>>,
}

/// Schema over the dynamic [`Value`] model, the common currency of the
/// heterogeneous combinators and the registry facade.
pub type DynBcsType = BcsType<Value, Value>;

impl<T: 'static, I: 'static> Clone for BcsType<T, I> {
    fn clone(&self) -> Self {
        BcsType {
            name: self.name.clone(),
            read: Arc::clone(&self.read),
            write: Arc::clone(&self.write),
            serialized_size: self.serialized_size.clone(),
            validate: self.validate.clone(),
            serialize: self.serialize.clone(),
        }
    }
}

impl<T: 'static, I: 'static> Debug for BcsType<T, I> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_tuple("BcsType").field(&self.name).finish()
    }
}

impl<T: 'static, I: 'static> BcsType<T, I> {
    pub fn new(
        name: impl Into<String>,
        read: impl Fn(&mut Reader) -> Result<T> + Send + Sync + 'static,
        write: impl Fn(&I, &mut Writer) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        BcsType {
            name: name.into(),
            read: Arc::new(read),
            write: Arc::new(write),
            serialized_size: None,
            validate: None,
            serialize: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach an input validator. If one is already present the new check
    /// runs first and both have to pass.
    pub fn with_validate(
        mut self,
        validate: impl Fn(&I) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.validate = Some(match self.validate.take() {
            None => Arc::new(validate),
            Some(prev) => Arc::new(move |value: &I| {
                validate(value)?;
                prev(value)
            }),
        });
        self
    }

    /// Attach an exact-serialized-size hint. `serialize` uses it to
    /// allocate the writer precisely.
    pub fn with_serialized_size(
        mut self,
        serialized_size: impl Fn(&I) -> Option<usize> + Send + Sync + 'static,
    ) -> Self {
        self.serialized_size = Some(Arc::new(serialized_size));
        self
    }

    /// Replace the default serialize path (allocate a writer, run
    /// `write`, take its bytes) with a custom one. Validation still runs
    /// first.
    pub fn with_serialize(
        mut self,
        serialize: impl Fn(&I, WriterOptions) -> Result<Vec<u8>> + Send + Sync + 'static,
    ) -> Self {
        self.serialize = Some(Arc::new(serialize));
        self
    }

    /// Read one value, leaving the cursor just past it.
    pub fn read(&self, reader: &mut Reader) -> Result<T> {
        (self.read)(reader)
    }

    /// Validate `value`, then write its encoding.
    pub fn write(&self, value: &I, writer: &mut Writer) -> Result<()> {
        self.validate(value)?;
        (self.write)(value, writer)
    }

    /// Run the input validator, if any.
    pub fn validate(&self, value: &I) -> Result<()> {
        match &self.validate {
            Some(validate) => validate(value),
            None => Ok(()),
        }
    }

    /// Exact size in bytes of the encoding of `value`, when computable
    /// without serializing.
    pub fn serialized_size(&self, value: &I) -> Option<usize> {
        self.serialized_size.as_ref().and_then(|f| f(value))
    }

    /// Parse a complete value out of `bytes`. Trailing bytes are an
    /// error; use [`BcsType::read`] to decode a prefix of a larger frame.
    pub fn parse(&self, bytes: &[u8]) -> Result<T> {
        let mut reader = Reader::new(bytes);
        let value = self.read(&mut reader)?;
        ensure!(
            reader.remaining() == 0,
            Malformed,
            "{} trailing byte(s) after {}",
            reader.remaining(),
            self.name,
        );
        Ok(value)
    }

    /// Serialize `value` into an envelope, sizing the writer from the
    /// schema's size hint when one is available.
    pub fn serialize(&self, value: &I) -> Result<Serialized<T, I>> {
        let mut options = WriterOptions::default();
        if let Some(size) = self.serialized_size(value) {
            options.initial_size = size;
        }
        self.serialize_with(value, options)
    }

    /// Serialize `value` with caller-provided writer sizing.
    pub fn serialize_with(
        &self,
        value: &I,
        options: WriterOptions,
    ) -> Result<Serialized<T, I>> {
        self.validate(value)?;
        let bytes = match &self.serialize {
            Some(serialize) => serialize(value, options)?,
            None => {
                let mut writer = Writer::with_options(options);
                (self.write)(value, &mut writer)?;
                writer.into_bytes()
            }
        };
        Ok(Serialized::new(self.clone(), bytes))
    }

    /// Wrap this schema with conversions on both ends: `input` maps the
    /// caller's type down to this schema's input before writing, `output`
    /// maps this schema's parse result up after reading. The size hint is
    /// carried through `input`; validation runs the conversion and then
    /// this schema's validator.
    pub fn transform<T2: 'static, I2: 'static>(
        &self,
        name: impl Into<String>,
        input: impl Fn(&I2) -> Result<I> + Send + Sync + 'static,
        output: impl Fn(T) -> Result<T2> + Send + Sync + 'static,
    ) -> BcsType<T2, I2> {
        let input = Arc::new(input);
        let read_inner = self.clone();
        let write_inner = self.clone();
        let size_inner = self.clone();
        let validate_inner = self.clone();
        let write_input = Arc::clone(&input);
        let size_input = Arc::clone(&input);
        let validate_input = Arc::clone(&input);
        BcsType {
            name: name.into(),
            read: Arc::new(move |reader| output(read_inner.read(reader)?)),
            write: Arc::new(move |value, writer| {
                let inner = write_input(value)?;
                write_inner.write(&inner, writer)
            }),
            serialized_size: Some(Arc::new(move |value| {
                let inner = size_input(value).ok()?;
                size_inner.serialized_size(&inner)
            })),
            validate: Some(Arc::new(move |value| {
                let inner = validate_input(value)?;
                validate_inner.validate(&inner)
            })),
            serialize: None,
        }
    }
}

impl<T, I> BcsType<T, I>
where
    T: IntoValue + 'static,
    I: FromValue + 'static,
{
    /// Erase this schema to the dynamic [`Value`] currency so it can sit
    /// inside a tuple, struct, or enum.
    pub fn dynamic(&self) -> DynBcsType {
        self.transform(
            self.name.clone(),
            |value: &Value| I::from_value(value),
            |parsed: T| Ok(parsed.into_value()),
        )
    }
}

/// Defer schema construction until first use, memoizing the result. This
/// is the one supported way to build a self-referential schema: express
/// the cycle as a factory and every recursion level resolves on demand.
pub fn lazy<T, I>(
    factory: impl Fn() -> BcsType<T, I> + Send + Sync + 'static,
) -> BcsType<T, I>
where
    T: 'static,
    I: 'static,
{
    struct Lazy<T: 'static, I: 'static> {
        cell: OnceCell<BcsType<T, I>>,
        factory: Box<dyn Fn() -> BcsType<T, I> + Send + Sync>,
    }

    impl<T: 'static, I: 'static> Lazy<T, I> {
        fn get(&self) -> &BcsType<T, I> {
            self.cell.get_or_init(|| {
                let schema = (self.factory)();
                trace!(name = schema.name(), "lazy schema initialized");
                schema
            })
        }
    }

    let lazy = Arc::new(Lazy {
        cell: OnceCell::new(),
        factory: Box::new(factory),
    });
    let read_lazy = Arc::clone(&lazy);
    let write_lazy = Arc::clone(&lazy);
    let size_lazy = Arc::clone(&lazy);
    let validate_lazy = Arc::clone(&lazy);
    let serialize_lazy = Arc::clone(&lazy);
    BcsType {
        name: "lazy".to_string(),
        read: Arc::new(move |reader| read_lazy.get().read(reader)),
        write: Arc::new(move |value, writer| write_lazy.get().write(value, writer)),
        serialized_size: Some(Arc::new(move |value| {
            size_lazy.get().serialized_size(value)
        })),
        validate: Some(Arc::new(move |value| validate_lazy.get().validate(value))),
        serialize: Some(Arc::new(move |value, options| {
            serialize_lazy
                .get()
                .serialize_with(value, options)
                .map(Serialized::into_bytes)
        })),
    }
}
