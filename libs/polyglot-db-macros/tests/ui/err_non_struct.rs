// Derive macro applied to a non-struct should abort.

use polyglot_db_macros::Translatable;

#[derive(Translatable)]
#[translatable(shared = "book::Entity")]
enum NotAStruct {
    A,
}

fn main() {
    let _ = NotAStruct::A;
}
