// Missing `shared` should abort with a hint.

use polyglot_db_macros::Translatable;

#[derive(Translatable)]
#[translatable(master_col = "book_id")]
struct Model;

fn main() {
    let _ = Model;
}
