use std::fmt;

use crate::{
    registry::{EnumRecord, InputRecord, InterfaceRecord, ObjectRecord, Record, Records, Registry, ScalarRecord, UnionRecord},
    OutputType,
};

/// The kind of a named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TypeKind {
    Object,
    Input,
    Interface,
    Union,
    Enum,
    Scalar,
}

impl TypeKind {
    /// Whether types of this kind can be the type of an output field.
    pub fn is_output(self) -> bool {
        !matches!(self, TypeKind::Input)
    }

    /// Whether types of this kind can be the type of an argument or input field.
    pub fn is_input(self) -> bool {
        matches!(self, TypeKind::Input | TypeKind::Enum | TypeKind::Scalar)
    }

    pub fn is_abstract(self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::Union)
    }
}

/// Implemented by the kind-narrowed ids.
pub trait KindId: Copy + Into<NamedTypeId> + fmt::Debug {
    const KIND: TypeKind;

    fn narrow(id: NamedTypeId) -> Option<Self>;
}

pub(crate) trait KindRecord: Sized + Clone + Default {
    type Id: KindId;
    const KIND: TypeKind;

    fn arena(registry: &Registry) -> &Vec<Record<Self>>;
    fn arena_mut(registry: &mut Registry) -> &mut Vec<Record<Self>>;
    fn make_id(index: usize, generation: u32) -> Self::Id;
    fn empty_output(name: &str) -> OutputType;
}

macro_rules! type_ids {
    ($($arena:ident [ $name:ident ] -> $record:ident as $variant:ident,)*) => {
        $(
            #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name {
                index: u32,
                generation: u32,
            }

            impl $name {
                pub(crate) fn index(self) -> usize {
                    self.index as usize
                }

                pub(crate) fn generation(self) -> u32 {
                    self.generation
                }
            }

            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}#{}.{}", stringify!($name), self.index, self.generation)
                }
            }

            impl KindId for $name {
                const KIND: TypeKind = TypeKind::$variant;

                fn narrow(id: NamedTypeId) -> Option<Self> {
                    match id {
                        NamedTypeId::$variant(id) => Some(id),
                        _ => None,
                    }
                }
            }

            impl From<$name> for NamedTypeId {
                fn from(id: $name) -> NamedTypeId {
                    NamedTypeId::$variant(id)
                }
            }

            impl std::ops::Index<$name> for Records {
                type Output = Record<$record>;

                fn index(&self, id: $name) -> &Self::Output {
                    &self.$arena[id.index()]
                }
            }

            impl std::ops::IndexMut<$name> for Records {
                fn index_mut(&mut self, id: $name) -> &mut Self::Output {
                    &mut self.$arena[id.index()]
                }
            }

            impl KindRecord for $record {
                type Id = $name;
                const KIND: TypeKind = TypeKind::$variant;

                fn arena(registry: &Registry) -> &Vec<Record<Self>> {
                    &registry.records.$arena
                }

                fn arena_mut(registry: &mut Registry) -> &mut Vec<Record<Self>> {
                    &mut registry.records.$arena
                }

                fn make_id(index: usize, generation: u32) -> $name {
                    $name {
                        index: index as u32,
                        generation,
                    }
                }

                fn empty_output(name: &str) -> OutputType {
                    OutputType::empty(TypeKind::$variant, name)
                }
            }
        )*
    }
}

type_ids! {
    objects[ObjectTypeId] -> ObjectRecord as Object,
    inputs[InputTypeId] -> InputRecord as Input,
    interfaces[InterfaceTypeId] -> InterfaceRecord as Interface,
    unions[UnionTypeId] -> UnionRecord as Union,
    enums[EnumTypeId] -> EnumRecord as Enum,
    scalars[ScalarTypeId] -> ScalarRecord as Scalar,
}

/// A handle to any named type of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NamedTypeId {
    Object(ObjectTypeId),
    Input(InputTypeId),
    Interface(InterfaceTypeId),
    Union(UnionTypeId),
    Enum(EnumTypeId),
    Scalar(ScalarTypeId),
}

impl NamedTypeId {
    pub fn kind(self) -> TypeKind {
        match self {
            NamedTypeId::Object(_) => TypeKind::Object,
            NamedTypeId::Input(_) => TypeKind::Input,
            NamedTypeId::Interface(_) => TypeKind::Interface,
            NamedTypeId::Union(_) => TypeKind::Union,
            NamedTypeId::Enum(_) => TypeKind::Enum,
            NamedTypeId::Scalar(_) => TypeKind::Scalar,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            NamedTypeId::Object(id) => id.index(),
            NamedTypeId::Input(id) => id.index(),
            NamedTypeId::Interface(id) => id.index(),
            NamedTypeId::Union(id) => id.index(),
            NamedTypeId::Enum(id) => id.index(),
            NamedTypeId::Scalar(id) => id.index(),
        }
    }

    pub(crate) fn generation(self) -> u32 {
        match self {
            NamedTypeId::Object(id) => id.generation(),
            NamedTypeId::Input(id) => id.generation(),
            NamedTypeId::Interface(id) => id.generation(),
            NamedTypeId::Union(id) => id.generation(),
            NamedTypeId::Enum(id) => id.generation(),
            NamedTypeId::Scalar(id) => id.generation(),
        }
    }

    pub fn as_object(self) -> Option<ObjectTypeId> {
        match self {
            NamedTypeId::Object(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_input(self) -> Option<InputTypeId> {
        match self {
            NamedTypeId::Input(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_interface(self) -> Option<InterfaceTypeId> {
        match self {
            NamedTypeId::Interface(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_union(self) -> Option<UnionTypeId> {
        match self {
            NamedTypeId::Union(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_enum(self) -> Option<EnumTypeId> {
        match self {
            NamedTypeId::Enum(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_scalar(self) -> Option<ScalarTypeId> {
        match self {
            NamedTypeId::Scalar(id) => Some(id),
            _ => None,
        }
    }
}
