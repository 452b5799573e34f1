use kya_files::common::types::{Memory, Ptr};

use crate::MeshLibraryError;

pub trait RawAssetLoader {
    /// in case of a caching implementation, this may need to clone the whole buffer!
    fn load_raw_owned(&self, path: &str) -> Option<Vec<u8>>;
}

/// Called with the memory image, the manager record and the name of every fully loaded asset.
pub type MeshLoadedListener = Box<dyn FnMut(&Memory, Ptr, &str) -> Result<(), MeshLibraryError> + Send>;

/// The loader's notification hook for finished G3D loads.
#[derive(Default)]
pub struct MeshLoadedDelegate {
    listeners: Vec<MeshLoadedListener>,
}

impl MeshLoadedDelegate {
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&Memory, Ptr, &str) -> Result<(), MeshLibraryError> + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Notifies every listener in subscription order, stopping at the first one that fails.
    pub fn broadcast(&mut self, memory: &Memory, manager: Ptr, name: &str) -> Result<(), MeshLibraryError> {
        self.listeners
            .iter_mut()
            .try_for_each(|listener| listener(memory, manager, name))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn broadcast_reaches_every_listener() -> Result<(), anyhow::Error> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut delegate = MeshLoadedDelegate::default();
        for id in 0..2 {
            let seen = seen.clone();
            delegate.subscribe(move |_, manager, name| {
                seen.lock().expect("not poisoned").push((id, manager, name.to_string()));
                Ok(())
            });
        }

        let bytes = [0u8; 4];
        delegate.broadcast(&Memory::new(&bytes), Ptr(0x40), "LEVEL\\SECT1.g3d")?;

        assert_eq!(delegate.listener_count(), 2);
        assert_eq!(
            *seen.lock().expect("not poisoned"),
            vec![
                (0, Ptr(0x40), "LEVEL\\SECT1.g3d".to_string()),
                (1, Ptr(0x40), "LEVEL\\SECT1.g3d".to_string()),
            ]
        );

        Ok(())
    }
}
