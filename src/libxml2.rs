//! Minimal safe wrapper around the libxml2 XSD validator.
//!
//! Only compiled with the `libxml2` feature; requires the system library. Both the
//! schema and the document are handed to libxml2 from memory, and violations come
//! back through a structured error callback so line numbers survive.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};
use std::sync::{Arc, Once};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibXml2Error {
    #[error("failed to parse XSD schema")]
    SchemaParse,
    #[error("failed to parse XML document")]
    DocumentParse,
    #[error("failed to create validation context")]
    ValidationContext,
    #[error("libxml2 internal error (code {0})")]
    Internal(c_int),
}

pub type LibXml2Result<T> = std::result::Result<T, LibXml2Error>;

// Opaque libxml2 handles.
#[repr(C)]
struct XmlSchema {
    _private: [u8; 0],
}
#[repr(C)]
struct XmlSchemaParserCtxt {
    _private: [u8; 0],
}
#[repr(C)]
struct XmlSchemaValidCtxt {
    _private: [u8; 0],
}
#[repr(C)]
struct XmlDoc {
    _private: [u8; 0],
}

/// Mirrors libxml2's `xmlError`; only `message` and `line` are read.
#[repr(C)]
struct XmlError {
    domain: c_int,
    code: c_int,
    message: *mut c_char,
    level: c_int,
    file: *mut c_char,
    line: c_int,
    str1: *mut c_char,
    str2: *mut c_char,
    str3: *mut c_char,
    int1: c_int,
    int2: c_int,
    ctxt: *mut c_void,
    node: *mut c_void,
}

type StructuredErrorFn = extern "C" fn(user_data: *mut c_void, error: *const XmlError);

#[link(name = "xml2")]
unsafe extern "C" {
    fn xmlInitParser();
    fn xmlSchemaNewMemParserCtxt(buffer: *const c_char, size: c_int)
    -> *mut XmlSchemaParserCtxt;
    fn xmlSchemaParse(ctxt: *mut XmlSchemaParserCtxt) -> *mut XmlSchema;
    fn xmlSchemaFreeParserCtxt(ctxt: *mut XmlSchemaParserCtxt);
    fn xmlSchemaFree(schema: *mut XmlSchema);
    fn xmlSchemaNewValidCtxt(schema: *mut XmlSchema) -> *mut XmlSchemaValidCtxt;
    fn xmlSchemaFreeValidCtxt(ctxt: *mut XmlSchemaValidCtxt);
    fn xmlSchemaSetValidStructuredErrors(
        ctxt: *mut XmlSchemaValidCtxt,
        serror: Option<StructuredErrorFn>,
        ctx: *mut c_void,
    );
    fn xmlReadMemory(
        buffer: *const c_char,
        size: c_int,
        url: *const c_char,
        encoding: *const c_char,
        options: c_int,
    ) -> *mut XmlDoc;
    fn xmlFreeDoc(doc: *mut XmlDoc);
    fn xmlSchemaValidateDoc(ctxt: *mut XmlSchemaValidCtxt, doc: *mut XmlDoc) -> c_int;
}

static INIT: Once = Once::new();

fn ensure_initialized() {
    INIT.call_once(|| unsafe { xmlInitParser() });
}

struct SchemaHandle(*mut XmlSchema);

// The parsed schema is immutable after xmlSchemaParse, so sharing the pointer
// across threads is sound as long as each thread uses its own validation context.
unsafe impl Send for SchemaHandle {}
unsafe impl Sync for SchemaHandle {}

impl Drop for SchemaHandle {
    fn drop(&mut self) {
        unsafe { xmlSchemaFree(self.0) }
    }
}

/// Shared handle to a parsed XSD schema.
#[derive(Clone)]
pub struct XmlSchemaPtr {
    inner: Arc<SchemaHandle>,
}

/// Parse XSD bytes into a reusable schema handle.
pub fn parse_schema(bytes: &[u8]) -> LibXml2Result<XmlSchemaPtr> {
    ensure_initialized();

    let size = c_int::try_from(bytes.len()).map_err(|_| LibXml2Error::SchemaParse)?;
    unsafe {
        let ctxt = xmlSchemaNewMemParserCtxt(bytes.as_ptr().cast::<c_char>(), size);
        if ctxt.is_null() {
            return Err(LibXml2Error::SchemaParse);
        }
        let schema = xmlSchemaParse(ctxt);
        xmlSchemaFreeParserCtxt(ctxt);
        if schema.is_null() {
            return Err(LibXml2Error::SchemaParse);
        }
        Ok(XmlSchemaPtr {
            inner: Arc::new(SchemaHandle(schema)),
        })
    }
}

extern "C" fn collect_error(user_data: *mut c_void, error: *const XmlError) {
    if user_data.is_null() || error.is_null() {
        return;
    }
    let sink = unsafe { &mut *user_data.cast::<Vec<(c_int, String)>>() };
    let error = unsafe { &*error };
    let message = if error.message.is_null() {
        String::from("unknown validation error")
    } else {
        unsafe { CStr::from_ptr(error.message) }
            .to_string_lossy()
            .trim_end()
            .to_string()
    };
    sink.push((error.line, message));
}

/// Validate document bytes against the schema.
///
/// Returns the violation list; empty means the document is valid. `Err` means
/// libxml2 itself failed and no verdict exists.
pub fn validate_document(
    schema: &XmlSchemaPtr,
    document: &[u8],
) -> LibXml2Result<Vec<(c_int, String)>> {
    ensure_initialized();

    let size = c_int::try_from(document.len()).map_err(|_| LibXml2Error::DocumentParse)?;
    unsafe {
        let doc = xmlReadMemory(
            document.as_ptr().cast::<c_char>(),
            size,
            c"noname.xml".as_ptr(),
            std::ptr::null(),
            0,
        );
        if doc.is_null() {
            return Err(LibXml2Error::DocumentParse);
        }

        let ctxt = xmlSchemaNewValidCtxt(schema.inner.0);
        if ctxt.is_null() {
            xmlFreeDoc(doc);
            return Err(LibXml2Error::ValidationContext);
        }

        let mut violations: Vec<(c_int, String)> = Vec::new();
        xmlSchemaSetValidStructuredErrors(
            ctxt,
            Some(collect_error),
            (&raw mut violations).cast::<c_void>(),
        );

        let code = xmlSchemaValidateDoc(ctxt, doc);
        xmlSchemaFreeValidCtxt(ctxt);
        xmlFreeDoc(doc);

        if code < 0 {
            return Err(LibXml2Error::Internal(code));
        }
        if code > 0 && violations.is_empty() {
            // Validation failed but the callback saw nothing; keep the verdict.
            violations.push((0, format!("schema validation failed (code {code})")));
        }
        Ok(violations)
    }
}
