//! Instanced transform buffer.

use std::collections::HashMap;

use glam::Mat4;

use layview_core::Color;

use crate::backend::RenderError;
use crate::config::{ArenaConfig, OverflowPolicy};
use crate::render_data::{InstanceData, MeshKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceSlot {
    pub mesh: MeshKind,
    pub transform: Mat4,
    pub material: usize,
}

impl InstanceSlot {
    const EMPTY: InstanceSlot = InstanceSlot {
        mesh: MeshKind::Box,
        transform: Mat4::ZERO,
        material: 0,
    };

    pub fn to_data(&self) -> InstanceData {
        InstanceData {
            mesh: self.mesh,
            transform: self.transform.to_cols_array(),
            material: self.material,
        }
    }
}

/// Preallocated instance buffer written through a cursor.
///
/// Slots past the cursor are stale. When the buffer is full the overflow
/// policy either doubles it or refuses the write.
#[derive(Debug)]
pub struct InstanceArena {
    slots: Vec<InstanceSlot>,
    cursor: usize,
    overflow: OverflowPolicy,
}

impl InstanceArena {
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            slots: vec![InstanceSlot::EMPTY; config.capacity],
            cursor: 0,
            overflow: config.overflow,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live instances.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Make room for `additional` more instances up front.
    pub fn reserve(&mut self, additional: usize) -> Result<(), RenderError> {
        let needed = self.cursor.saturating_add(additional);
        if needed <= self.slots.len() {
            return Ok(());
        }
        match self.overflow {
            OverflowPolicy::Reject => Err(RenderError::ArenaFull {
                needed,
                capacity: self.slots.len(),
            }),
            OverflowPolicy::Grow => {
                let new_capacity = needed.max(self.slots.len() * 2).max(1);
                log::warn!(
                    "scene: growing instance arena {} -> {}",
                    self.slots.len(),
                    new_capacity
                );
                self.slots.resize(new_capacity, InstanceSlot::EMPTY);
                Ok(())
            }
        }
    }

    /// Write an instance at the cursor and return its slot index.
    pub fn push(&mut self, slot: InstanceSlot) -> Result<usize, RenderError> {
        self.reserve(1)?;
        let index = self.cursor;
        self.slots[index] = slot;
        self.cursor += 1;
        Ok(index)
    }

    pub fn get(&self, index: usize) -> Option<&InstanceSlot> {
        self.live().get(index)
    }

    pub fn live(&self) -> &[InstanceSlot] {
        &self.slots[..self.cursor]
    }

    /// Forget every instance; capacity is kept.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

/// Interned colours; instances refer to a colour by its slot.
#[derive(Debug, Default)]
pub struct Palette {
    colors: Vec<Color>,
    slots: HashMap<Color, usize>,
}

impl Palette {
    pub fn material(&mut self, color: Color) -> usize {
        if let Some(&slot) = self.slots.get(&color) {
            return slot;
        }
        let slot = self.colors.len();
        self.colors.push(color);
        self.slots.insert(color, slot);
        slot
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(x: f32) -> InstanceSlot {
        InstanceSlot {
            mesh: MeshKind::Cylinder,
            transform: Mat4::from_translation(glam::Vec3::new(x, 0.0, 0.0)),
            material: 0,
        }
    }

    #[test]
    fn test_push_and_reset() {
        let mut arena = InstanceArena::new(ArenaConfig { capacity: 4, overflow: OverflowPolicy::Reject });
        assert_eq!(arena.push(slot(1.0)).unwrap(), 0);
        assert_eq!(arena.push(slot(2.0)).unwrap(), 1);
        assert_eq!(arena.live().len(), 2);
        assert_eq!(arena.get(1).unwrap().transform.w_axis.x, 2.0);
        assert!(arena.get(2).is_none());

        arena.reset();
        assert!(arena.is_empty());
        assert_eq!(arena.capacity(), 4);
        assert_eq!(arena.push(slot(3.0)).unwrap(), 0);
    }

    #[test]
    fn test_reject_when_full() {
        let mut arena = InstanceArena::new(ArenaConfig { capacity: 2, overflow: OverflowPolicy::Reject });
        arena.push(slot(0.0)).unwrap();
        assert_eq!(
            arena.reserve(5),
            Err(RenderError::ArenaFull { needed: 6, capacity: 2 })
        );
        arena.push(slot(0.0)).unwrap();
        assert!(arena.push(slot(0.0)).is_err());
        assert_eq!(arena.cursor(), 2);
    }

    #[test]
    fn test_grow_when_full() {
        let mut arena = InstanceArena::new(ArenaConfig { capacity: 2, overflow: OverflowPolicy::Grow });
        for i in 0..5 {
            arena.push(slot(i as f32)).unwrap();
        }
        assert_eq!(arena.cursor(), 5);
        assert!(arena.capacity() >= 5);
        assert_eq!(arena.get(4).unwrap().transform.w_axis.x, 4.0);
    }

    #[test]
    fn test_grow_from_zero_capacity() {
        let mut arena = InstanceArena::new(ArenaConfig { capacity: 0, overflow: OverflowPolicy::Grow });
        arena.push(slot(0.0)).unwrap();
        assert_eq!(arena.capacity(), 1);
    }

    #[test]
    fn test_palette_interns_colors() {
        let mut palette = Palette::default();
        let a = palette.material(Color::BLACK);
        let b = palette.material(Color::WHITE);
        assert_eq!(palette.material(Color::BLACK), a);
        assert_ne!(a, b);
        assert_eq!(palette.colors().len(), 2);
    }
}
