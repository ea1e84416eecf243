//! A person composed from an occupation and a car.
//!
//! `Person` does not expose its parts' fields as its own; the occupation
//! accessors are forwarded one by one.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupation {
  name: String,
  years_of_experience: u32,
}

impl Occupation {
  pub fn new(name: impl Into<String>, years_of_experience: u32) -> Self {
    Self {
      name: name.into(),
      years_of_experience,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn years_of_experience(&self) -> u32 {
    self.years_of_experience
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Car {
  pub maker: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
  pub full_name: String,
  pub age: u32,
  occupation: Occupation,
  car: Option<Car>,
}

impl Person {
  pub fn new(full_name: impl Into<String>, age: u32, occupation: Occupation) -> Self {
    Self {
      full_name: full_name.into(),
      age,
      occupation,
      car: None,
    }
  }

  pub fn with_car(mut self, car: Car) -> Self {
    self.car = Some(car);
    self
  }

  pub fn occupation_name(&self) -> &str {
    self.occupation.name()
  }

  pub fn years_of_experience(&self) -> u32 {
    self.occupation.years_of_experience()
  }

  pub fn occupation(&self) -> &Occupation {
    &self.occupation
  }

  pub fn car(&self) -> Option<&Car> {
    self.car.as_ref()
  }

  /// Records one more year on the job.
  pub fn gain_experience(&mut self) {
    self.occupation.years_of_experience += 1;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn occupation_accessors_are_forwarded() {
    let mut person = Person::new("Ada Lovelace", 36, Occupation::new("mathematician", 10))
      .with_car(Car {
        maker: "Babbage".into(),
      });

    assert_eq!(person.occupation_name(), "mathematician");
    assert_eq!(person.years_of_experience(), 10);
    person.gain_experience();
    assert_eq!(person.occupation().years_of_experience(), 11);
    assert_eq!(person.car().map(|c| c.maker.as_str()), Some("Babbage"));
  }
}
