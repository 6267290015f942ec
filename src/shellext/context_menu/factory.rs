use super::{CropCommandHandler, LegacyContextMenuHandler};
use crate::config::HandlerKind;
use crate::shellext::dll::{ModuleRef, lock_server};
use windows::{
    Win32::{Foundation::*, System::Com::*},
    core::*,
};

// Class factory for the registered handler variant
#[implement(IClassFactory)]
pub struct PyCropperClassFactory {
    handler: HandlerKind,
    _module: ModuleRef,
}

impl PyCropperClassFactory {
    pub fn new(handler: HandlerKind) -> Self {
        Self {
            handler,
            _module: ModuleRef::new(),
        }
    }
}

impl IClassFactory_Impl for PyCropperClassFactory_Impl {
    fn CreateInstance(
        &self,
        outer: Option<&IUnknown>,
        iid: *const GUID,
        result: *mut *mut core::ffi::c_void,
    ) -> Result<()> {
        if outer.is_some() {
            return Err(Error::from(CLASS_E_NOAGGREGATION));
        }

        tracing::debug!(target: "shellext::dll", handler = ?self.handler, "CreateInstance called");

        let handler: IUnknown = match self.handler {
            HandlerKind::ExplorerCommand => CropCommandHandler::root().into(),
            HandlerKind::LegacyContextMenu => LegacyContextMenuHandler::new().into(),
        };

        unsafe { handler.query(iid, result).ok() }
    }

    fn LockServer(&self, lock: BOOL) -> Result<()> {
        lock_server(lock.as_bool());
        Ok(())
    }
}
