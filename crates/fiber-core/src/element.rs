//! Immutable element descriptors.
//!
//! An [`Element`] names what should exist at one position of the UI; it is
//! produced fresh on every render and never mutated. Work nodes reference the
//! element's [`Props`] by shared pointer.

use std::any::{type_name, TypeId};
use std::fmt;
use std::mem::size_of;
use std::rc::Rc;

use crate::props::{Props, NODE_VALUE};

type RenderFn = Rc<dyn Fn(&Props) -> Vec<Element>>;

/// A function component.
///
/// A function item or a non-capturing closure is identified by its Rust type,
/// so `Component::new(counter)` built on two different renders still matches
/// positionally. Any other render function (a capturing closure, a `fn`
/// pointer passed to [`Component::new`]) is identified by the `Component`
/// value itself: clones match, separately built components do not. Use
/// [`Component::from_fn`] to key a `fn` pointer by its address instead.
#[derive(Clone)]
pub struct Component {
    id: TypeId,
    /// Function address or `render` allocation when the type alone cannot
    /// tell functions apart.
    instance: Option<usize>,
    name: &'static str,
    render: RenderFn,
}

impl Component {
    pub fn new<F, R>(render: F) -> Self
    where
        F: Fn(&Props) -> R + 'static,
        R: IntoElements,
    {
        Self::named(short_name(type_name::<F>()), render)
    }

    pub fn named<F, R>(name: &'static str, render: F) -> Self
    where
        F: Fn(&Props) -> R + 'static,
        R: IntoElements,
    {
        let render: RenderFn = Rc::new(move |props: &Props| render(props).into_elements());
        let instance = (size_of::<F>() != 0).then(|| Rc::as_ptr(&render) as *const () as usize);
        Self {
            id: TypeId::of::<F>(),
            instance,
            name,
            render,
        }
    }

    /// A component keyed by the address of `render`, so the same function
    /// matches itself across renders and different functions never match.
    pub fn from_fn<R>(render: fn(&Props) -> R) -> Self
    where
        R: IntoElements + 'static,
    {
        Self {
            id: TypeId::of::<fn(&Props) -> R>(),
            instance: Some(render as usize),
            name: "anonymous",
            render: Rc::new(move |props: &Props| render(props).into_elements()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn invoke(&self, props: &Props) -> Vec<Element> {
        (self.render)(props)
    }
}

fn short_name(full: &'static str) -> &'static str {
    if full.starts_with("fn(") || full.starts_with("for<") {
        return "anonymous";
    }
    full.rsplit("::").next().unwrap_or(full)
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.instance == other.instance
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.name).finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementType {
    Host(Rc<str>),
    /// Reserved type of normalized primitive children.
    Text,
    Component(Component),
}

impl ElementType {
    pub fn is_component(&self) -> bool {
        matches!(self, ElementType::Component(_))
    }
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        ElementType::Host(Rc::from(tag))
    }
}

impl From<String> for ElementType {
    fn from(tag: String) -> Self {
        ElementType::Host(Rc::from(tag))
    }
}

impl From<Component> for ElementType {
    fn from(component: Component) -> Self {
        ElementType::Component(component)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    ty: ElementType,
    props: Rc<Props>,
}

impl Element {
    pub fn element_type(&self) -> &ElementType {
        &self.ty
    }

    pub fn props(&self) -> &Rc<Props> {
        &self.props
    }

    pub fn children(&self) -> &[Element] {
        self.props.children()
    }

    /// Value of a text element, `None` for anything else.
    pub fn text(&self) -> Option<&str> {
        match self.ty {
            ElementType::Text => self.props.get_str(NODE_VALUE),
            _ => None,
        }
    }
}

/// One child argument of [`create_element`].
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Element(Element),
    Text(String),
}

impl Child {
    fn normalize(self) -> Element {
        match self {
            Child::Element(element) => element,
            Child::Text(text) => create_text_element(text),
        }
    }
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Child::Element(element)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_owned())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

macro_rules! display_child {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Child {
            fn from(value: $ty) -> Self {
                Child::Text(value.to_string())
            }
        })*
    };
}

display_child!(i32, i64, u32, u64, usize, f32, f64, bool, char);

/// Return value of a component render function.
pub trait IntoElements {
    fn into_elements(self) -> Vec<Element>;
}

impl IntoElements for Element {
    fn into_elements(self) -> Vec<Element> {
        vec![self]
    }
}

impl IntoElements for Vec<Element> {
    fn into_elements(self) -> Vec<Element> {
        self
    }
}

impl IntoElements for Option<Element> {
    fn into_elements(self) -> Vec<Element> {
        self.into_iter().collect()
    }
}

pub fn create_element<T, I, C>(ty: T, props: Props, children: I) -> Element
where
    T: Into<ElementType>,
    I: IntoIterator<Item = C>,
    C: Into<Child>,
{
    let children = children
        .into_iter()
        .map(|child| child.into().normalize())
        .collect();
    Element {
        ty: ty.into(),
        props: Rc::new(props.with_children(children)),
    }
}

pub fn create_text_element(text: impl Into<String>) -> Element {
    Element {
        ty: ElementType::Text,
        props: Rc::new(Props::new().with(NODE_VALUE, text.into())),
    }
}

/// `element!(type, props, child, ...)` with heterogeneous children.
#[macro_export]
macro_rules! element {
    ($ty:expr) => {
        $crate::create_element($ty, $crate::Props::new(), ::std::iter::empty::<$crate::Child>())
    };
    ($ty:expr, $props:expr $(, $child:expr)* $(,)?) => {{
        let children: ::std::vec::Vec<$crate::Child> =
            ::std::vec![$($crate::Child::from($child)),*];
        $crate::create_element($ty, $props, children)
    }};
}
