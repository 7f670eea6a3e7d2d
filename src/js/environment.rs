use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context as AnyhowContext, Result};
use rquickjs::convert::Coerced;
use rquickjs::function::Rest;
use rquickjs::{Ctx, Exception, Function, IntoJs, Object, Value};
use tracing::{debug, error, warn};

use super::runtime::QuickJsEngine;
use crate::config::BridgeConfig;
use crate::document::{
    ArgValue, BindingError, DocumentInstance, EngineValue, PropertySlot, PropertyTable,
};
use crate::dom::{NativeDocumentHandle, NativeTree, NodeId, SharedTree};

/// A QuickJS context with `document` bound to a native tree.
pub struct JsDocumentEnvironment {
    engine: QuickJsEngine,
    tree: SharedTree,
    document: Rc<RefCell<DocumentInstance>>,
}

impl JsDocumentEnvironment {
    pub fn new(html: &str) -> Result<Self> {
        Self::with_config(html, &BridgeConfig::default())
    }

    pub fn with_config(html: &str, config: &BridgeConfig) -> Result<Self> {
        let tree = Rc::new(RefCell::new(NativeTree::from_html(html)));
        Self::from_tree(tree, config)
    }

    pub fn from_tree(tree: SharedTree, config: &BridgeConfig) -> Result<Self> {
        let engine = QuickJsEngine::with_config(&config.engine)?;
        let document = Rc::new(RefCell::new(DocumentInstance::new(
            PropertyTable::install(),
            NativeDocumentHandle::new(&tree),
            config.document.clone(),
        )));
        engine
            .with_context(|ctx| install_document_bindings(&ctx, Rc::clone(&document)))
            .context("failed to install document bindings")?;
        Ok(Self {
            engine,
            tree,
            document,
        })
    }

    pub fn eval(&self, source: &str, filename: &str) -> Result<()> {
        self.engine.eval(source, filename)
    }

    pub fn eval_with<V>(&self, source: &str, filename: &str) -> Result<V>
    where
        V: for<'js> rquickjs::FromJs<'js>,
    {
        self.engine.eval_with(source, filename)
    }

    pub fn document(&self) -> &Rc<RefCell<DocumentInstance>> {
        &self.document
    }

    pub fn tree(&self) -> &SharedTree {
        &self.tree
    }

    pub fn document_html(&self) -> String {
        self.tree.borrow().to_html()
    }
}

/// Registers the native half of the document binding on `ctx` and evaluates the
/// script half that defines `globalThis.document`.
pub fn install_document_bindings<'js>(
    ctx: &Ctx<'js>,
    document: Rc<RefCell<DocumentInstance>>,
) -> rquickjs::Result<()> {
    let global = ctx.globals();

    // Dispatch
    {
        let document = Rc::clone(&document);
        let func = Function::new(
            ctx.clone(),
            move |name: String| -> rquickjs::Result<PropertySlot> {
                Ok(document.borrow_mut().get_property(&name))
            },
        )?
        .with_name("__frontier_dom_property")?;
        global.set("__frontier_dom_property", func)?;
    }

    {
        let document = Rc::clone(&document);
        let func = Function::new(ctx.clone(), move || -> Vec<String> {
            document
                .borrow()
                .property_names()
                .map(str::to_string)
                .collect()
        })?
        .with_name("__frontier_dom_property_names")?;
        global.set("__frontier_dom_property_names", func)?;
    }

    // One engine function per binding table entry
    {
        let bindings = Object::new(ctx.clone())?;
        let entries: Vec<_> = document.borrow().bindings().iter().copied().collect();
        for binding in entries {
            let document = Rc::clone(&document);
            let entry = binding.entry();
            let func = Function::new(
                ctx.clone(),
                move |ctx: Ctx<'js>, args: Rest<Value<'js>>| -> rquickjs::Result<EngineValue> {
                    let args = args
                        .iter()
                        .map(arg_from_js)
                        .collect::<rquickjs::Result<Vec<_>>>()?;
                    let result = entry(&mut document.borrow_mut(), &args);
                    result.or_else(|err| binding_error(&ctx, err))
                },
            )?
            .with_name(binding.name())?;
            bindings.set(binding.name(), func)?;
        }
        global.set("__frontier_dom_bindings", bindings)?;
    }

    // Node accessors
    {
        let document = Rc::clone(&document);
        let func = Function::new(ctx.clone(), move || -> f64 {
            document
                .borrow()
                .native()
                .root()
                .map_or(f64::NAN, |root| root as f64)
        })?
        .with_name("__frontier_dom_document_handle")?;
        global.set("__frontier_dom_document_handle", func)?;
    }

    {
        let document = Rc::clone(&document);
        let func = Function::new(ctx.clone(), move |handle: f64| -> Option<i32> {
            let node = node_id(handle)?;
            document.borrow().node_type(node).map(i32::from)
        })?
        .with_name("__frontier_dom_node_type")?;
        global.set("__frontier_dom_node_type", func)?;
    }

    {
        let document = Rc::clone(&document);
        let func = Function::new(ctx.clone(), move |handle: f64| -> Option<String> {
            document.borrow().node_name(node_id(handle)?)
        })?
        .with_name("__frontier_dom_node_name")?;
        global.set("__frontier_dom_node_name", func)?;
    }

    {
        let document = Rc::clone(&document);
        let func = Function::new(ctx.clone(), move |handle: f64| -> Option<String> {
            document.borrow().tag_name(node_id(handle)?)
        })?
        .with_name("__frontier_dom_tag_name")?;
        global.set("__frontier_dom_tag_name", func)?;
    }

    {
        let document = Rc::clone(&document);
        let func = Function::new(ctx.clone(), move |handle: f64| -> Option<String> {
            document.borrow().text_content(node_id(handle)?)
        })?
        .with_name("__frontier_dom_get_text")?;
        global.set("__frontier_dom_get_text", func)?;
    }

    {
        let document = Rc::clone(&document);
        let func = Function::new(ctx.clone(), move |handle: f64| -> Option<f64> {
            let parent = document.borrow().parent_node(node_id(handle)?)?;
            Some(parent as f64)
        })?
        .with_name("__frontier_dom_parent")?;
        global.set("__frontier_dom_parent", func)?;
    }

    {
        let document = Rc::clone(&document);
        let func = Function::new(ctx.clone(), move |handle: f64| -> Vec<f64> {
            node_id(handle)
                .map(|node| document.borrow().child_nodes(node))
                .unwrap_or_default()
                .into_iter()
                .map(|child| child as f64)
                .collect()
        })?
        .with_name("__frontier_dom_child_nodes")?;
        global.set("__frontier_dom_child_nodes", func)?;
    }

    {
        let document = Rc::clone(&document);
        let func = Function::new(
            ctx.clone(),
            move |handle: f64, name: String| -> Option<String> {
                document.borrow().attribute(node_id(handle)?, &name)
            },
        )?
        .with_name("__frontier_dom_get_attribute")?;
        global.set("__frontier_dom_get_attribute", func)?;
    }

    // Mutation helpers
    {
        let document = Rc::clone(&document);
        let func = Function::new(
            ctx.clone(),
            move |ctx: Ctx<'js>,
                  handle: f64,
                  name: String,
                  value: Coerced<String>|
                  -> rquickjs::Result<()> {
                let node = node_arg(&ctx, handle)?;
                let result = document.borrow_mut().set_attribute(node, &name, &value.0);
                result.or_else(|err| binding_error(&ctx, err))
            },
        )?
        .with_name("__frontier_dom_set_attribute")?;
        global.set("__frontier_dom_set_attribute", func)?;
    }

    {
        let document = Rc::clone(&document);
        let func = Function::new(
            ctx.clone(),
            move |ctx: Ctx<'js>, handle: f64, name: String| -> rquickjs::Result<()> {
                let node = node_arg(&ctx, handle)?;
                let result = document.borrow_mut().remove_attribute(node, &name);
                result.or_else(|err| binding_error(&ctx, err))
            },
        )?
        .with_name("__frontier_dom_remove_attribute")?;
        global.set("__frontier_dom_remove_attribute", func)?;
    }

    {
        let document = Rc::clone(&document);
        let func = Function::new(
            ctx.clone(),
            move |ctx: Ctx<'js>, parent: f64, child: f64| -> rquickjs::Result<()> {
                let (parent, child) = (node_arg(&ctx, parent)?, node_arg(&ctx, child)?);
                let result = document.borrow_mut().append_child(parent, child);
                result.or_else(|err| binding_error(&ctx, err))
            },
        )?
        .with_name("__frontier_dom_append_child")?;
        global.set("__frontier_dom_append_child", func)?;
    }

    {
        let document = Rc::clone(&document);
        let func = Function::new(
            ctx.clone(),
            move |ctx: Ctx<'js>, parent: f64, child: f64| -> rquickjs::Result<()> {
                let (parent, child) = (node_arg(&ctx, parent)?, node_arg(&ctx, child)?);
                let result = document.borrow_mut().remove_child(parent, child);
                result.or_else(|err| binding_error(&ctx, err))
            },
        )?
        .with_name("__frontier_dom_remove_child")?;
        global.set("__frontier_dom_remove_child", func)?;
    }

    match ctx.eval::<(), _>(DOM_BOOTSTRAP.as_bytes()) {
        Ok(()) => {
            debug!(target: "quickjs", "document bindings installed");
            Ok(())
        }
        Err(err) => {
            if let rquickjs::Error::Exception = err {
                let value: Value<'_> = ctx.catch();
                error!(target: "quickjs", "DOM bootstrap failed: {:?}", value);
            }
            Err(err)
        }
    }
}

/// Raises `err` in the engine: argument problems as `TypeError`, the rest as
/// plain `Error`.
fn binding_error<T>(ctx: &Ctx<'_>, err: BindingError) -> rquickjs::Result<T> {
    warn!(target: "document", error = %err, "document binding failed");
    let message = err.to_string();
    if err.is_type_error() {
        Err(Exception::throw_type(ctx, &message))
    } else {
        Err(Exception::throw_message(ctx, &message))
    }
}

fn arg_from_js(value: &Value<'_>) -> rquickjs::Result<ArgValue> {
    if value.is_undefined() {
        return Ok(ArgValue::Undefined);
    }
    if value.is_null() {
        return Ok(ArgValue::Null);
    }
    if let Some(flag) = value.as_bool() {
        return Ok(ArgValue::Bool(flag));
    }
    if let Some(number) = value.as_number() {
        return Ok(ArgValue::Number(number));
    }
    if let Some(string) = value.as_string() {
        return Ok(ArgValue::String(string.to_string()?));
    }
    let Coerced(text) = value.get::<Coerced<String>>()?;
    Ok(ArgValue::Object(text))
}

fn node_id(handle: f64) -> Option<NodeId> {
    (handle.is_finite() && handle >= 0.0 && handle.fract() == 0.0).then_some(handle as NodeId)
}

fn node_arg(ctx: &Ctx<'_>, handle: f64) -> rquickjs::Result<NodeId> {
    node_id(handle).ok_or_else(|| Exception::throw_type(ctx, "argument is not a node"))
}

fn tagged<'js>(
    ctx: &Ctx<'js>,
    kind: &str,
    value: Option<Value<'js>>,
) -> rquickjs::Result<Value<'js>> {
    let object = Object::new(ctx.clone())?;
    object.set("kind", kind)?;
    if let Some(value) = value {
        object.set("value", value)?;
    }
    Ok(object.into_value())
}

impl<'js> IntoJs<'js> for EngineValue {
    fn into_js(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        match self {
            EngineValue::Undefined => tagged(ctx, "undefined", None),
            EngineValue::Null => tagged(ctx, "null", None),
            EngineValue::String(text) => {
                let value = text.into_js(ctx)?;
                tagged(ctx, "string", Some(value))
            }
            EngineValue::Node(node) => {
                let value = (node as f64).into_js(ctx)?;
                tagged(ctx, "node", Some(value))
            }
            EngineValue::Collection(nodes) => {
                let handles: Vec<f64> = nodes.into_iter().map(|node| node as f64).collect();
                let value = handles.into_js(ctx)?;
                tagged(ctx, "collection", Some(value))
            }
        }
    }
}

impl<'js> IntoJs<'js> for PropertySlot {
    fn into_js(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        match self {
            PropertySlot::Callable(property) => {
                let name = property.name().into_js(ctx)?;
                tagged(ctx, "callable", Some(name))
            }
            PropertySlot::Value(value) => value.into_js(ctx),
            PropertySlot::Delegate => tagged(ctx, "delegate", None),
        }
    }
}

const DOM_BOOTSTRAP: &str = r#"
(() => {
    const global = globalThis;
    if (typeof global.window !== 'object' || global.window === null) {
        global.window = global;
    }
    const HANDLE = Symbol('frontierHandle');
    const NODE_CACHE = new Map();
    const CALLABLES = new Map();

    function wrapHandle(handle, typeHint) {
        if (handle == null || Number.isNaN(handle)) {
            return null;
        }
        if (NODE_CACHE.has(handle)) {
            return NODE_CACHE.get(handle);
        }
        const wrapper = createWrapper(handle, typeHint);
        NODE_CACHE.set(handle, wrapper);
        return wrapper;
    }

    function createWrapper(handle, typeHint) {
        const type = typeHint ?? global.__frontier_dom_node_type(handle);
        let proto;
        switch (type) {
            case 1:
                proto = ElementProto;
                break;
            case 3:
                proto = TextProto;
                break;
            case 8:
                proto = CommentProto;
                break;
            default:
                proto = NodeProto;
                break;
        }
        const node = Object.create(proto);
        node[HANDLE] = handle;
        return node;
    }

    function toHandle(node) {
        if (node == null || typeof node !== 'object' || !(HANDLE in node)) {
            throw new TypeError('parameter 1 is not of type \'Node\'.');
        }
        return node[HANDLE];
    }

    function unwrap(result) {
        switch (result.kind) {
            case 'null':
                return null;
            case 'string':
                return result.value;
            case 'node':
                return wrapHandle(result.value);
            case 'collection':
                return result.value.map((handle) => wrapHandle(handle));
            default:
                return undefined;
        }
    }

    const NodeProto = {
        get nodeType() {
            return global.__frontier_dom_node_type(this[HANDLE]);
        },
        get nodeName() {
            return global.__frontier_dom_node_name(this[HANDLE]);
        },
        get ownerDocument() {
            return global.document;
        },
        get parentNode() {
            return wrapHandle(global.__frontier_dom_parent(this[HANDLE]));
        },
        get childNodes() {
            return global.__frontier_dom_child_nodes(this[HANDLE]).map((handle) => wrapHandle(handle));
        },
        get firstChild() {
            return this.childNodes[0] ?? null;
        },
        hasChildNodes() {
            return global.__frontier_dom_child_nodes(this[HANDLE]).length > 0;
        },
        appendChild(node) {
            global.__frontier_dom_append_child(this[HANDLE], toHandle(node));
            return node;
        },
        removeChild(node) {
            global.__frontier_dom_remove_child(this[HANDLE], toHandle(node));
            return node;
        },
        get textContent() {
            const value = global.__frontier_dom_get_text(this[HANDLE]);
            return value == null ? null : value;
        },
    };

    const ElementProto = Object.create(NodeProto, {
        tagName: {
            get() {
                return global.__frontier_dom_tag_name(this[HANDLE]);
            },
        },
        id: {
            get() {
                return global.__frontier_dom_get_attribute(this[HANDLE], 'id') ?? '';
            },
            set(value) {
                global.__frontier_dom_set_attribute(this[HANDLE], 'id', value);
            },
        },
        getAttribute: {
            value(name) {
                return global.__frontier_dom_get_attribute(this[HANDLE], String(name)) ?? null;
            },
        },
        hasAttribute: {
            value(name) {
                return global.__frontier_dom_get_attribute(this[HANDLE], String(name)) != null;
            },
        },
        setAttribute: {
            value(name, value) {
                global.__frontier_dom_set_attribute(this[HANDLE], String(name), value);
            },
        },
        removeAttribute: {
            value(name) {
                global.__frontier_dom_remove_attribute(this[HANDLE], String(name));
            },
        },
    });

    const CharacterDataProto = Object.create(NodeProto, {
        data: {
            get() {
                return global.__frontier_dom_get_text(this[HANDLE]) ?? '';
            },
        },
        length: {
            get() {
                return this.data.length;
            },
        },
    });
    const TextProto = Object.create(CharacterDataProto);
    const CommentProto = Object.create(CharacterDataProto);

    const bindings = global.__frontier_dom_bindings;
    for (const name of Object.keys(bindings)) {
        const native = bindings[name];
        const callable = function (...args) {
            return unwrap(native(...args));
        };
        Object.defineProperty(callable, 'name', { value: name });
        CALLABLES.set(name, callable);
    }

    function resolve(name) {
        const slot = global.__frontier_dom_property(name);
        switch (slot.kind) {
            case 'callable':
                return { found: true, value: CALLABLES.get(slot.value) };
            case 'delegate':
                return { found: false };
            default:
                return { found: true, value: unwrap(slot) };
        }
    }

    const base = wrapHandle(global.__frontier_dom_document_handle(), 9);
    const names = () => global.__frontier_dom_property_names();

    global.document = new Proxy(base, {
        get(target, prop, receiver) {
            if (typeof prop === 'string') {
                const resolved = resolve(prop);
                if (resolved.found) {
                    return resolved.value;
                }
            }
            return Reflect.get(target, prop, receiver);
        },
        set(target, prop, value, receiver) {
            if (typeof prop === 'string' && names().includes(prop)) {
                return false;
            }
            return Reflect.set(target, prop, value, receiver);
        },
        has(target, prop) {
            return (typeof prop === 'string' && names().includes(prop)) || Reflect.has(target, prop);
        },
        ownKeys() {
            return names();
        },
        getOwnPropertyDescriptor(target, prop) {
            if (typeof prop !== 'string' || !names().includes(prop)) {
                return undefined;
            }
            return {
                value: resolve(prop).value,
                writable: false,
                enumerable: true,
                configurable: true,
            };
        },
    });
})();
"#;
