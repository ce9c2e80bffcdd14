// Attribute values must be string literals.

use polyglot_db_macros::Translatable;

#[derive(Translatable)]
#[translatable(shared = book::Entity)]
struct Model;

fn main() {
    let _ = Model;
}
