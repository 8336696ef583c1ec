use idl_types::InterfaceNode;
use std::collections::BTreeMap;

/* Interfaces whose vtables come from go-ole rather than from the IDL:
 * (name, parent, methods in slot order) */
const OLE_INTERFACES: &[(&str, Option<&str>, &[&str])] = &[
    ("IUnknown", None, &["QueryInterface", "AddRef", "Release"]),
    (
        "IDispatch",
        Some("IUnknown"),
        &["GetTypeInfoCount", "GetTypeInfo", "GetIDsOfNames", "Invoke"],
    ),
];

/// True when `name` is provided by the go-ole package.
pub fn is_ole_interface(name: &str) -> bool {
    OLE_INTERFACES.iter().any(|(ole, _, _)| *ole == name)
}

/* Total vtable slots of a go-ole interface, ancestors included */
fn ole_slot_count(name: &str) -> Option<usize> {
    let (_, parent, methods) = OLE_INTERFACES.iter().find(|(ole, _, _)| *ole == name)?;
    let inherited = match parent {
        Some(parent) => ole_slot_count(parent)?,
        None => 0,
    };
    Some(inherited + methods.len())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VtableSlot {
    pub interface: String,
    pub method: String,
    /* absolute vtable index; None when the chain ends at an unknown parent */
    pub index: Option<usize>,
}

/// Flattened view of one interface's vtable, computed once at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VtableLayout {
    pub interface: String,
    /* parent whose layout is embedded, after collapsing method-less markers */
    pub parent: String,
    /* go-ole interface the chain bottoms out at, if any */
    pub root: Option<String>,
    pub root_slots: Option<usize>,
    /* IDL-declared slots reachable through this interface, ancestors first */
    pub slots: Vec<VtableSlot>,
    pub own_slots: usize,
}

impl VtableLayout {
    pub fn own(&self) -> &[VtableSlot] {
        &self.slots[self.slots.len() - self.own_slots..]
    }

    pub fn inherited(&self) -> &[VtableSlot] {
        &self.slots[..self.slots.len() - self.own_slots]
    }

    /* Vtable width including the go-ole root, when known */
    pub fn total_slots(&self) -> Option<usize> {
        self.root_slots.map(|root| root + self.slots.len())
    }

    pub fn parent_known(&self) -> bool {
        self.root.is_some()
    }
}

/// Registry of interface layouts in declaration order.
#[derive(Debug)]
pub struct LayoutRegistry {
    root_interface: String,
    layouts: Vec<VtableLayout>,
    by_name: BTreeMap<String, usize>,
    /* method-less interfaces mapped to the parent they stand in for */
    markers: BTreeMap<String, String>,
}

impl LayoutRegistry {
    pub fn new(root_interface: &str) -> Self {
        Self {
            root_interface: root_interface.to_string(),
            layouts: Vec::new(),
            by_name: BTreeMap::new(),
            markers: BTreeMap::new(),
        }
    }

    /// Parent an interface's vtable embeds. Method-less marker interfaces
    /// produce no code and add no slots, so they collapse to their own parent.
    pub fn resolve_parent(&self, declared: Option<&str>) -> String {
        let mut parent = declared.unwrap_or(&self.root_interface).to_string();
        while let Some(next) = self.markers.get(&parent) {
            parent = next.clone();
        }
        parent
    }

    /// Records an interface. Returns `None` for method-less markers.
    pub fn register(&mut self, iface: &InterfaceNode) -> Option<&VtableLayout> {
        let parent = self.resolve_parent(iface.parent.as_deref());

        if iface.methods.is_empty() {
            self.markers.insert(iface.name.clone(), parent);
            return None;
        }

        let (root, root_slots, mut slots) = match self.get(&parent) {
            Some(parent_layout) => (
                parent_layout.root.clone(),
                parent_layout.root_slots,
                parent_layout.slots.clone(),
            ),
            None => match ole_slot_count(&parent) {
                Some(count) => (Some(parent.clone()), Some(count), Vec::new()),
                None => (None, None, Vec::new()),
            },
        };

        let first_index = root_slots.map(|root| root + slots.len());
        for (offset, method) in iface.methods.iter().enumerate() {
            slots.push(VtableSlot {
                interface: iface.name.clone(),
                method: method.name.clone(),
                index: first_index.map(|first| first + offset),
            });
        }

        let layout = VtableLayout {
            interface: iface.name.clone(),
            parent,
            root,
            root_slots,
            slots,
            own_slots: iface.methods.len(),
        };

        let position = match self.by_name.get(&iface.name) {
            Some(&existing) => {
                self.layouts[existing] = layout;
                existing
            }
            None => {
                self.layouts.push(layout);
                self.by_name.insert(iface.name.clone(), self.layouts.len() - 1);
                self.layouts.len() - 1
            }
        };
        self.layouts.get(position)
    }

    pub fn get(&self, name: &str) -> Option<&VtableLayout> {
        self.by_name.get(name).map(|&idx| &self.layouts[idx])
    }
}
