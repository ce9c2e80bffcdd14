// `shared` must parse as a type path.

use polyglot_db_macros::Translatable;

#[derive(Translatable)]
#[translatable(shared = "not a path")]
struct Model;

fn main() {
    let _ = Model;
}
