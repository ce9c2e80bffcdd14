// Duplicate attribute: shared specified twice should abort.

use polyglot_db_macros::Translatable;

#[derive(Translatable)]
#[translatable(shared = "book::Entity")]
#[translatable(shared = "author::Entity")]
struct Model;

fn main() {
    let _ = Model;
}
