//! Model reflection
//!
//! The [`Reflector`] walks a [`TypeDescriptor`] and records a [`Metadata`]
//! for it in the shared [`Registry`]. Root members become fields; members of
//! nested structs are flattened into the inner fields. When
//! `register_nested` is on, every nested struct also gets its own entry so
//! the `$ref`s emitted by the renderer resolve.
//!
//! The qualified names currently being expanded form a visited stack. A
//! member whose type is already on the stack is recorded as a reference and
//! not expanded again, which keeps self-referential models finite.

use {
    crate::{
        bridge,
        config::ReflectOptions,
        descriptor::{FieldDef, Model, Shape, TypeDescriptor, TypeName, TypeRef},
        error::SchemaResult,
        kind::SchemaKind,
        logging,
        metadata::{Field, ItemRef, Metadata},
        registry::Registry,
    },
    schemars::JsonSchema,
    std::{sync::Arc, time::Instant},
};

/// Derives and registers [`Metadata`] records.
#[derive(Debug, Clone)]
pub struct Reflector {
    registry: Arc<Registry>,
    options: ReflectOptions,
}

impl Reflector {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            options: ReflectOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReflectOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn options(&self) -> &ReflectOptions {
        &self.options
    }

    /// Reflect and register `M`. Returns the registered record unchanged
    /// when `M` was reflected before.
    pub fn reflect<M: Model>(&self) -> Arc<Metadata> {
        self.reflect_root(
            Arc::new(M::describe()),
            Some(M::schema_desc()),
            Some(M::schema_type()),
        )
    }

    pub fn reflect_descriptor(&self, descriptor: &TypeDescriptor) -> Arc<Metadata> {
        self.reflect_root(Arc::new(descriptor.clone()), None, None)
    }

    /// Register `M` plus an array record `List[M]` whose items point at it.
    pub fn reflect_list<M: Model>(&self) -> Arc<Metadata> {
        let item = self.reflect::<M>();
        let name = TypeName::new(
            format!("List[{}]", item.name()),
            format!("List[{}]", item.qualified_name()),
        );

        if let Some(existing) = self.registry.get(&name.qualified) {
            logging::log_cache_hit(&name.qualified);
            return existing;
        }

        let meta = Metadata::new(name, SchemaKind::Array)
            .with_description(M::schema_desc())
            .with_items(ItemRef::Model(item.qualified_name().to_string()));
        self.registry.save(meta)
    }

    /// Import a `schemars` type and reflect it like any other model.
    pub fn reflect_json_schema<T: JsonSchema>(&self) -> SchemaResult<Arc<Metadata>> {
        let descriptor = bridge::describe::<T>()?;
        Ok(self.reflect_root(Arc::new(descriptor), None, None))
    }

    fn reflect_root(
        &self,
        descriptor: Arc<TypeDescriptor>,
        description: Option<String>,
        kind: Option<SchemaKind>,
    ) -> Arc<Metadata> {
        let descriptor = descriptor.indirect();
        let name = descriptor.name.qualified.as_str();

        if let Some(existing) = self.registry.get(name) {
            logging::log_cache_hit(name);
            return self.apply_overrides(existing, description, kind);
        }

        let span = logging::reflect_span(name);
        let _enter = span.enter();
        let started = Instant::now();

        let mut visiting = Vec::new();
        let mut meta = self.build(&descriptor, &mut visiting);
        if let Some(description) = description {
            meta = meta.with_description(description);
        }
        if let Some(kind) = kind {
            meta.set_kind(kind);
        }

        logging::log_reflected(
            name,
            meta.fields().len(),
            meta.inner_fields().len(),
            started.elapsed(),
        );
        self.registry.save(meta)
    }

    // A record first registered as a nested member was built without the
    // model's own description and kind.
    fn apply_overrides(
        &self,
        existing: Arc<Metadata>,
        description: Option<String>,
        kind: Option<SchemaKind>,
    ) -> Arc<Metadata> {
        let description = description.filter(|d| d != existing.description());
        let kind = kind.filter(|&k| k != existing.kind());
        if description.is_none() && kind.is_none() {
            return existing;
        }

        let mut meta = (*existing).clone();
        if let Some(description) = description {
            meta = meta.with_description(description);
        }
        if let Some(kind) = kind {
            meta.set_kind(kind);
        }
        self.registry.save(meta)
    }

    fn build(&self, descriptor: &TypeDescriptor, visiting: &mut Vec<String>) -> Metadata {
        let mut meta = Metadata::new(descriptor.name.clone(), descriptor.kind());
        if let Some(description) = &descriptor.description {
            meta = meta.with_description(description.clone());
        }

        match &descriptor.shape {
            Shape::Struct(def) => {
                visiting.push(descriptor.name.qualified.clone());
                let mut walk = Walk {
                    reflector: self,
                    root: &descriptor.name.qualified,
                    meta: &mut meta,
                    visiting: &mut *visiting,
                };
                for (index, member) in def.fields.iter().enumerate() {
                    walk.extract_field(index, member, 0);
                }
                visiting.pop();
            }
            Shape::Seq { element, .. } => {
                let (item, nested) = element_ref(element, &self.options);
                meta.set_items(item);
                if let Some(nested) = nested {
                    if self.options.register_nested {
                        self.register_nested(&nested, visiting);
                    }
                }
            }
            Shape::Bool
            | Shape::Char
            | Shape::Str
            | Shape::Integer { .. }
            | Shape::Float { .. }
            | Shape::Map { .. }
            | Shape::Pointer(_)
            | Shape::Any
            | Shape::Unit
            | Shape::Reference(_) => {}
        }

        meta
    }

    // Gives a nested struct its own entry unless it is already registered
    // or still being built further up the stack.
    fn register_nested(&self, descriptor: &TypeDescriptor, visiting: &mut Vec<String>) {
        let name = &descriptor.name.qualified;
        if visiting.contains(name) || self.registry.contains(name) {
            return;
        }
        let meta = self.build(descriptor, visiting);
        self.registry.save(meta);
    }
}

// Member walk of one record being built.
struct Walk<'a> {
    reflector: &'a Reflector,
    root: &'a str,
    meta: &'a mut Metadata,
    visiting: &'a mut Vec<String>,
}

impl Walk<'_> {
    fn extract_field(&mut self, index: usize, def: &FieldDef, depth: usize) {
        let options = &self.reflector.options;

        if options.is_private(&def.name) {
            logging::log_field_skipped(self.root, &def.name, "private");
            return;
        }
        if !def.exported && options.skip_unexported {
            logging::log_field_skipped(self.root, &def.name, "unexported");
            return;
        }

        let ty = def.ty.resolve().indirect();
        if options.is_marker(&ty) {
            logging::log_field_skipped(self.root, &def.name, "base_model");
            return;
        }

        let field = Field::new(&def.name, index, &def.annotation, ty.kind())
            .exported(def.exported)
            .embedded(def.embedded);
        if field.constraints().skip {
            logging::log_field_skipped(self.root, &def.name, "json_skip");
            return;
        }

        let (item_ref, nested) = match &ty.shape {
            Shape::Seq { element, .. } => {
                let (item, nested) = element_ref(element, options);
                (Some(item), nested)
            }
            Shape::Struct(_) => (
                Some(ItemRef::Model(ty.name.qualified.clone())),
                Some(Arc::clone(&ty)),
            ),
            Shape::Reference(target) => (Some(ItemRef::Model(target.qualified.clone())), None),
            Shape::Bool
            | Shape::Char
            | Shape::Str
            | Shape::Integer { .. }
            | Shape::Float { .. }
            | Shape::Map { .. }
            | Shape::Pointer(_)
            | Shape::Any
            | Shape::Unit => (None, None),
        };

        let field = field.with_item_ref(item_ref);
        if depth == 0 {
            self.meta.push_field(field);
        } else {
            self.meta.push_inner_field(field);
        }

        if let Some(nested) = nested {
            self.expand(&def.name, &nested, depth + 1);
        }
    }

    fn expand(&mut self, field: &str, descriptor: &Arc<TypeDescriptor>, depth: usize) {
        let Some(def) = descriptor.as_struct() else {
            return;
        };
        let target = &descriptor.name.qualified;

        if self.visiting.contains(target) {
            logging::log_cycle_detected(self.root, field, target);
            return;
        }

        if depth > self.reflector.options.max_depth {
            logging::log_depth_limit(self.root, field, depth);
        } else {
            self.visiting.push(target.clone());
            for (index, member) in def.fields.iter().enumerate() {
                self.extract_field(index, member, depth);
            }
            self.visiting.pop();
        }

        if self.reflector.options.register_nested {
            self.reflector.register_nested(descriptor, &mut *self.visiting);
        }
    }
}

// Item reference of a sequence element, plus the struct to expand when the
// element is one.
fn element_ref(
    element: &TypeRef,
    options: &ReflectOptions,
) -> (ItemRef, Option<Arc<TypeDescriptor>>) {
    let ty = element.resolve().indirect();
    match &ty.shape {
        Shape::Seq { element, .. } => {
            let (inner, nested) = element_ref(element, options);
            (ItemRef::Array(Box::new(inner)), nested)
        }
        Shape::Struct(_) if !options.is_marker(&ty) => {
            (ItemRef::Model(ty.name.qualified.clone()), Some(Arc::clone(&ty)))
        }
        Shape::Reference(target) => (ItemRef::Model(target.qualified.clone()), None),
        _ => (ItemRef::Kind(ty.kind()), None),
    }
}
