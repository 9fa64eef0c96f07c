//! Syscall entry points.
//!
//! One function per boundary verb. Every entry validates handles, access
//! rights, and lengths before touching object or provider state, and
//! output buffers follow the two-phase size negotiation: the required
//! size is written back through the caller's length cell whether or not
//! the capacity sufficed.

mod asymm;
mod authenc;
mod cipher;
mod derive;
mod hash;
mod object;
mod operation;
mod random;

pub use asymm::{asymm_operate, asymm_verify};
pub use authenc::{ae_dec_final, ae_enc_final, ae_init, ae_update, ae_update_aad};
pub use cipher::{cipher_final, cipher_init, cipher_update};
pub use derive::derive_key;
pub use hash::{hash_final, hash_init, hash_update};
pub use object::{
    obj_alloc, obj_close, obj_copy, obj_generate_key, obj_get_attr, obj_get_info, obj_populate,
    obj_reset, obj_restrict_usage,
};
pub use operation::{state_alloc, state_copy, state_free};
pub use random::random_number_generate;
