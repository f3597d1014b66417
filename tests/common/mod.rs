#![allow(dead_code)]

use new0::abi::ObjectHeader;
use new0::protocol::E_DONE;
use new0::{BridgeError, BridgeResult, ForeignInterpreter};
use std::cell::{Cell, RefCell};
use std::ffi::{c_int, c_void, CStr};
use std::ptr::{self, NonNull};

static MAIN_MODULE: u8 = 1;
static MAIN_DICT: u8 = 2;
static NODE: u8 = 3;

pub fn module_ptr() -> *mut c_void {
    ptr::addr_of!(MAIN_MODULE) as *mut c_void
}

pub fn dict_ptr() -> *mut c_void {
    ptr::addr_of!(MAIN_DICT) as *mut c_void
}

pub fn node_ptr() -> *mut c_void {
    ptr::addr_of!(NODE) as *mut c_void
}

/// A foreign call observed by [`ScriptedInterpreter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    InitAll,
    Parse { source: String, max_nodes: c_int },
    AddModule(String),
    GetModuleDict(*mut c_void),
    Eval {
        node: *mut c_void,
        filename: String,
        globals: *mut c_void,
        locals: *mut c_void,
    },
    PrintError,
    Release(*mut ObjectHeader),
}

/// Stand-in interpreter that records calls and returns scripted results.
pub struct ScriptedInterpreter {
    calls: RefCell<Vec<Call>>,
    parse_status: Cell<c_int>,
    eval_result: Cell<*mut ObjectHeader>,
    eval_missing: Cell<bool>,
}

impl ScriptedInterpreter {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            parse_status: Cell::new(E_DONE),
            eval_result: Cell::new(NonNull::dangling().as_ptr()),
            eval_missing: Cell::new(false),
        }
    }

    pub fn fail_parse(&self, status: c_int) {
        self.parse_status.set(status);
    }

    pub fn fail_eval(&self) {
        self.eval_result.set(ptr::null_mut());
    }

    /// Behave like a library that does not export `eval_node`.
    pub fn without_eval_node(&self) {
        self.eval_missing.set(true);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| matches(call)).count()
    }

    pub fn parsed_sources(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Parse { source, .. } => Some(source.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl ForeignInterpreter for ScriptedInterpreter {
    fn init_all(&self) -> BridgeResult<()> {
        self.record(Call::InitAll);
        Ok(())
    }

    fn parse_string(
        &self,
        source: &CStr,
        max_nodes: c_int,
        node: &mut *mut c_void,
    ) -> BridgeResult<c_int> {
        self.record(Call::Parse {
            source: source.to_string_lossy().into_owned(),
            max_nodes,
        });
        if self.parse_status.get() == E_DONE {
            *node = node_ptr();
        }
        Ok(self.parse_status.get())
    }

    fn add_module(&self, name: &CStr) -> BridgeResult<*mut c_void> {
        self.record(Call::AddModule(name.to_string_lossy().into_owned()));
        Ok(module_ptr())
    }

    unsafe fn get_module_dict(&self, module: *mut c_void) -> BridgeResult<*mut c_void> {
        self.record(Call::GetModuleDict(module));
        Ok(dict_ptr())
    }

    unsafe fn eval_node(
        &self,
        node: *mut c_void,
        filename: &CStr,
        globals: *mut c_void,
        locals: *mut c_void,
    ) -> BridgeResult<*mut ObjectHeader> {
        if self.eval_missing.get() {
            return Err(BridgeError::SymbolNotFound {
                name: "eval_node",
                source: libloading::Error::DlSymUnknown,
            });
        }
        self.record(Call::Eval {
            node,
            filename: filename.to_string_lossy().into_owned(),
            globals,
            locals,
        });
        Ok(self.eval_result.get())
    }

    fn print_error(&self) -> BridgeResult<()> {
        self.record(Call::PrintError);
        Ok(())
    }

    unsafe fn release(&self, object: *mut ObjectHeader) {
        self.record(Call::Release(object));
        new0::refcount::release(object);
    }
}
