//! Buffer circular acotado y thread-safe.
//!
//! Base del archivo de actividades completadas:
//! - Capacidad fija (C >= 0) decidida en la construcción.
//! - `add` nunca falla: al llenarse se descarta primero el elemento más
//!   antiguo (rotación FIFO).
//! - Sin remoción selectiva: `remove` reporta `RemovalUnsupported` porque el
//!   archivo es sólo append/evict.
//! - Un único lock interno protege el backing store; ninguna operación
//!   invoca código ajeno mientras lo sostiene (`contains` compara sobre una
//!   copia ya liberada).

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::errors::CoreStatsError;

#[derive(Debug)]
pub struct BoundedRing<T> {
    inner: Mutex<RingInner<T>>,
}

#[derive(Debug)]
struct RingInner<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> BoundedRing<T> {
    pub fn new(capacity: usize) -> Self {
        Self { inner: Mutex::new(RingInner { items: VecDeque::with_capacity(capacity),
                                             capacity }) }
    }

    /// Construye un ring con contenido inicial, conservando sólo los
    /// `capacity` elementos más recientes (los más antiguos se descartan).
    pub fn with_items(capacity: usize, items: Vec<T>) -> Self {
        let skip = items.len().saturating_sub(capacity);
        let kept: VecDeque<T> = items.into_iter().skip(skip).collect();
        Self { inner: Mutex::new(RingInner { items: kept, capacity }) }
    }

    // Un Mutex envenenado sólo puede venir de un pánico con el lock tomado;
    // el estado sigue siendo consistente para este uso, así que se recupera.
    fn locked(&self) -> MutexGuard<'_, RingInner<T>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Inserta al final. Siempre reporta éxito; si el ring está lleno se
    /// descarta primero el elemento más antiguo.
    pub fn add(&self, item: T) -> bool {
        let mut guard = self.locked();
        if guard.capacity == 0 {
            // Capacidad cero: todo elemento se descarta inmediatamente.
            return true;
        }
        if guard.items.len() >= guard.capacity {
            guard.items.pop_front();
        }
        guard.items.push_back(item);
        true
    }

    /// Inserta cada elemento en orden. El lock se toma por elemento: frente a
    /// `add` concurrentes los elementos pueden quedar no contiguos (garantía
    /// relajada; los llamadores no dependen de contigüidad).
    pub fn add_all<I: IntoIterator<Item = T>>(&self, items: I) -> bool {
        for item in items {
            self.add(item);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.locked().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locked().items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.locked().capacity
    }

    /// Copia materializada en orden de inserción (más antiguo primero).
    /// La iteración nunca observa una mutación a medias: copia atómica y
    /// liberación del lock antes de devolver.
    pub fn snapshot(&self) -> Vec<T> {
        self.locked().items.iter().cloned().collect()
    }

    /// Vacía el ring sin retener referencias.
    pub fn clear(&self) {
        let mut guard = self.locked();
        guard.items.clear();
        guard.items.shrink_to_fit();
    }

    /// Remoción selectiva no soportada: restricción de diseño del archivo.
    pub fn remove(&self, _item: &T) -> Result<(), CoreStatsError> {
        Err(CoreStatsError::RemovalUnsupported)
    }

    /// Reconstruye el ring con otra capacidad conservando los elementos más
    /// recientes (usado en recarga administrativa de configuración).
    pub fn resized(&self, new_capacity: usize) -> BoundedRing<T> {
        BoundedRing::with_items(new_capacity, self.snapshot())
    }
}

impl<T: Clone + PartialEq> BoundedRing<T> {
    /// Presencia por igualdad. Compara sobre una copia: el `PartialEq` del
    /// elemento nunca corre con el lock interno tomado.
    pub fn contains(&self, item: &T) -> bool {
        self.snapshot().iter().any(|i| i == item)
    }

    pub fn contains_all<'a, I: IntoIterator<Item = &'a T>>(&self, items: I) -> bool
        where T: 'a
    {
        let copy = self.snapshot();
        items.into_iter().all(|i| copy.contains(i))
    }
}
