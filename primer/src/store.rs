//! Generic stores over any product type.

pub trait Product {
  fn name(&self) -> &str;
  fn price(&self) -> f64;
}

pub trait Store<P: Product> {
  fn stock(&self) -> &[P];
  fn restock(&mut self, product: P);
  /// Removes and returns everything on the shelves.
  fn clear(&mut self) -> Vec<P>;
}

/// Sells the whole stock of `store`, returning the products sold and the
/// revenue.
pub fn sell_products<P, S>(store: &mut S) -> (Vec<P>, f64)
where
  P: Product,
  S: Store<P>,
{
  let sold = store.clear();
  let revenue = sold.iter().map(Product::price).sum();
  (sold, revenue)
}

/// Splits a slice into two halves; the second gets the extra element when the
/// length is odd.
pub fn split_half<T>(items: &[T]) -> (&[T], &[T]) {
  items.split_at(items.len() / 2)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
  pub title: String,
  pub author: String,
  pub price: f64,
}

impl Product for Book {
  fn name(&self) -> &str {
    &self.title
  }

  fn price(&self) -> f64 {
    self.price
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toy {
  pub name: String,
  pub price: f64,
}

impl Product for Toy {
  fn name(&self) -> &str {
    &self.name
  }

  fn price(&self) -> f64 {
    self.price
  }
}

#[derive(Debug, Default)]
pub struct BookStore {
  books: Vec<Book>,
}

#[derive(Debug, Default)]
pub struct ToyStore {
  toys: Vec<Toy>,
}

impl Store<Book> for BookStore {
  fn stock(&self) -> &[Book] {
    &self.books
  }

  fn restock(&mut self, product: Book) {
    self.books.push(product);
  }

  fn clear(&mut self) -> Vec<Book> {
    std::mem::take(&mut self.books)
  }
}

impl Store<Toy> for ToyStore {
  fn stock(&self) -> &[Toy] {
    &self.toys
  }

  fn restock(&mut self, product: Toy) {
    self.toys.push(product);
  }

  fn clear(&mut self) -> Vec<Toy> {
    std::mem::take(&mut self.toys)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn selling_empties_the_store() {
    let mut books = BookStore::default();
    books.restock(Book {
      title: "The Go Programming Language".into(),
      author: "Donovan".into(),
      price: 30.0,
    });
    books.restock(Book {
      title: "The Rust Programming Language".into(),
      author: "Klabnik".into(),
      price: 40.0,
    });

    let (sold, revenue) = sell_products(&mut books);
    assert_eq!(sold.len(), 2);
    assert_eq!(sold[1].name(), "The Rust Programming Language");
    assert_eq!(revenue, 70.0);
    assert!(books.stock().is_empty());
  }

  #[test]
  fn same_function_sells_toys() {
    let mut toys = ToyStore::default();
    toys.restock(Toy {
      name: "kite".into(),
      price: 12.5,
    });
    let (sold, revenue) = sell_products(&mut toys);
    assert_eq!(sold[0].name(), "kite");
    assert_eq!(revenue, 12.5);
  }

  #[test]
  fn split_half_rounds_down_on_the_left() {
    assert_eq!(split_half(&[1, 2, 3, 4, 5]), (&[1, 2][..], &[3, 4, 5][..]));
    assert_eq!(split_half::<u8>(&[]), (&[][..], &[][..]));
  }
}
