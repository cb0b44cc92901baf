/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use core::any::TypeId;
use std::sync::Arc;

use polybson::hierarchy::{default_convention, read_members, DiscriminatorConvention};
use polybson::prelude::*;
use polybson::ser::{Error, Result};

// The classic menagerie: Animal is a concrete root, Cat an abstract middle
// class, Tiger a leaf under Cat, Bear a leaf directly under Animal.
#[derive(Debug, Clone, PartialEq)]
enum Animal {
    Animal { name: String },
    Bear { name: String },
    Tiger { id: i32, name: String, age: i32 },
}

struct AnimalClass;
struct CatClass;
struct BearClass;
struct TigerClass;

trait Pet {}

struct Fixture {
    registry: Arc<HierarchyRegistry>,
    bear: Arc<polybson::hierarchy::ClassMap>,
    tiger: Arc<polybson::hierarchy::ClassMap>,
    animal: Arc<polybson::hierarchy::ClassMap>,
}

fn fixture() -> Fixture {
    let registry = Arc::new(HierarchyRegistry::new());
    let animal = registry
        .register(ClassMap::builder::<AnimalClass>("Animal"))
        .unwrap();
    registry
        .register(ClassMap::builder::<CatClass>("Cat").parent("Animal"))
        .unwrap();
    let bear = registry
        .register(
            ClassMap::builder::<BearClass>("Bear")
                .parent("Animal")
                .implements::<dyn Pet>(),
        )
        .unwrap();
    let tiger = registry
        .register(
            ClassMap::builder::<TigerClass>("Tiger")
                .parent("Cat")
                .id_member("_id")
                .implements::<dyn Pet>(),
        )
        .unwrap();
    Fixture {
        registry,
        bear,
        tiger,
        animal,
    }
}

fn write_name_member(value: &Animal, writer: &mut dyn RawWriter) -> Result<()> {
    let name = match value {
        Animal::Animal { name } => name,
        Animal::Bear { name } => name,
        Animal::Tiger { name, .. } => name,
    };
    Ok(writer.write_string(name)?)
}

fn write_tiger_id(value: &Animal, writer: &mut dyn RawWriter) -> Result<()> {
    let Animal::Tiger { id, .. } = value else {
        unreachable!()
    };
    Ok(writer.write_i32(*id)?)
}

fn write_tiger_age(value: &Animal, writer: &mut dyn RawWriter) -> Result<()> {
    let Animal::Tiger { age, .. } = value else {
        unreachable!()
    };
    Ok(writer.write_i32(*age)?)
}

fn read_name_only(reader: &mut dyn RawReader, discriminator: &str) -> Result<String> {
    let mut name = None;
    read_members(reader, discriminator, |member, reader| match member {
        "Name" => {
            name = Some(reader.read_string()?);
            Ok(true)
        }
        _ => Ok(false),
    })?;
    name.ok_or_else(|| Error::MissingField("Name".to_string()))
}

fn read_animal(reader: &mut dyn RawReader, discriminator: &str) -> Result<Animal> {
    Ok(Animal::Animal {
        name: read_name_only(reader, discriminator)?,
    })
}

fn read_bear(reader: &mut dyn RawReader, discriminator: &str) -> Result<Animal> {
    Ok(Animal::Bear {
        name: read_name_only(reader, discriminator)?,
    })
}

fn read_tiger(reader: &mut dyn RawReader, discriminator: &str) -> Result<Animal> {
    let mut id = None;
    let mut name = None;
    let mut age = None;
    read_members(reader, discriminator, |member, reader| match member {
        "_id" => {
            id = Some(reader.read_i32()?);
            Ok(true)
        }
        "Name" => {
            name = Some(reader.read_string()?);
            Ok(true)
        }
        "Age" => {
            age = Some(reader.read_i32()?);
            Ok(true)
        }
        _ => Ok(false),
    })?;
    Ok(Animal::Tiger {
        id: id.ok_or_else(|| Error::MissingField("_id".to_string()))?,
        name: name.ok_or_else(|| Error::MissingField("Name".to_string()))?,
        age: age.ok_or_else(|| Error::MissingField("Age".to_string()))?,
    })
}

fn animal_serializer(
    fixture: &Fixture,
    convention: Arc<dyn DiscriminatorConvention>,
    nominal: TypeId,
) -> HierarchySerializer<Animal> {
    HierarchySerializer::new(nominal, convention)
        .serialize_id_first(true)
        .variant(
            HierarchyVariant::new(
                fixture.animal.clone(),
                |value: &Animal| matches!(value, Animal::Animal { .. }),
                read_animal,
            )
            .member("Name", write_name_member),
        )
        .variant(
            HierarchyVariant::new(
                fixture.bear.clone(),
                |value: &Animal| matches!(value, Animal::Bear { .. }),
                read_bear,
            )
            .member("Name", write_name_member),
        )
        .variant(
            HierarchyVariant::new(
                fixture.tiger.clone(),
                |value: &Animal| matches!(value, Animal::Tiger { .. }),
                read_tiger,
            )
            .member("_id", write_tiger_id)
            .member("Age", write_tiger_age)
            .member("Name", write_name_member),
        )
}

fn to_bytes(serializer: &HierarchySerializer<Animal>, value: &Animal) -> Vec<u8> {
    let mut writer = VecWriter::new();
    serializer.serialize(&mut writer, value).unwrap();
    writer.into_bytes()
}

fn from_bytes(serializer: &HierarchySerializer<Animal>, bytes: &[u8]) -> Result<Animal> {
    let mut reader = SliceReader::new(bytes);
    serializer.deserialize(&mut reader)
}

fn tiger() -> Animal {
    Animal::Tiger {
        id: 1,
        name: "Shere Khan".to_string(),
        age: 11,
    }
}

#[test]
fn test_hierarchical_discriminator_chain() {
    let fixture = fixture();
    let convention = Arc::new(StandardDiscriminatorConvention::hierarchical(
        fixture.registry.clone(),
    ));
    let serializer = animal_serializer(&fixture, convention, TypeId::of::<AnimalClass>());

    let bytes = to_bytes(&serializer, &tiger());
    let document = Document::from_bytes(&bytes).unwrap();
    assert_eq!(
        document.get_array("_t").unwrap(),
        &[
            Bson::String("Animal".to_string()),
            Bson::String("Cat".to_string()),
            Bson::String("Tiger".to_string()),
        ]
    );
}

#[test]
fn test_id_first_element_order() {
    let fixture = fixture();
    let convention = Arc::new(StandardDiscriminatorConvention::hierarchical(
        fixture.registry.clone(),
    ));
    let serializer = animal_serializer(&fixture, convention, TypeId::of::<AnimalClass>());

    let bytes = to_bytes(&serializer, &tiger());
    let document = Document::from_bytes(&bytes).unwrap();
    let names: Vec<&str> = document.keys().collect();
    assert_eq!(names, vec!["_id", "_t", "Age", "Name"]);
}

#[test]
fn test_scalar_discriminator() {
    let fixture = fixture();
    let convention = Arc::new(StandardDiscriminatorConvention::scalar(
        fixture.registry.clone(),
    ));
    let serializer = animal_serializer(&fixture, convention, TypeId::of::<AnimalClass>());

    let bytes = to_bytes(&serializer, &tiger());
    let document = Document::from_bytes(&bytes).unwrap();
    assert_eq!(document.get_str("_t"), Some("Tiger"));
}

#[test]
fn test_discriminator_elided_for_root_through_root() {
    let fixture = fixture();
    let convention = Arc::new(StandardDiscriminatorConvention::scalar(
        fixture.registry.clone(),
    ));
    let serializer = animal_serializer(&fixture, convention.clone(), TypeId::of::<AnimalClass>());

    // an Animal serialized through an Animal slot carries no discriminator
    let plain = Animal::Animal {
        name: "Rex".to_string(),
    };
    let bytes = to_bytes(&serializer, &plain);
    let document = Document::from_bytes(&bytes).unwrap();
    assert!(!document.contains_key("_t"));
    assert_eq!(from_bytes(&serializer, &bytes).unwrap(), plain);

    // a Bear through the same slot does
    let bear = Animal::Bear {
        name: "Baloo".to_string(),
    };
    let bytes = to_bytes(&serializer, &bear);
    let document = Document::from_bytes(&bytes).unwrap();
    assert_eq!(document.get_str("_t"), Some("Bear"));

    // and a Bear through a Bear slot still does: Bear is not a root
    let bear_nominal = animal_serializer(&fixture, convention, TypeId::of::<BearClass>());
    let bytes = to_bytes(&bear_nominal, &bear);
    let document = Document::from_bytes(&bytes).unwrap();
    assert_eq!(document.get_str("_t"), Some("Bear"));
}

#[test]
fn test_roundtrip_through_hierarchy() {
    let fixture = fixture();
    for convention in [
        Arc::new(StandardDiscriminatorConvention::scalar(
            fixture.registry.clone(),
        )) as Arc<dyn DiscriminatorConvention>,
        default_convention(fixture.registry.clone()),
    ] {
        let serializer = animal_serializer(&fixture, convention, TypeId::of::<AnimalClass>());
        for value in [
            Animal::Animal {
                name: "Rex".to_string(),
            },
            Animal::Bear {
                name: "Baloo".to_string(),
            },
            tiger(),
        ] {
            let bytes = to_bytes(&serializer, &value);
            assert_eq!(from_bytes(&serializer, &bytes).unwrap(), value);
        }
    }
}

#[test]
fn test_missing_discriminator_reads_as_nominal() {
    let fixture = fixture();
    let convention = Arc::new(StandardDiscriminatorConvention::scalar(
        fixture.registry.clone(),
    ));
    let serializer = animal_serializer(&fixture, convention, TypeId::of::<AnimalClass>());

    let bytes = polybson::doc! { "Name" => "Rex" }.to_bytes().unwrap();
    assert_eq!(
        from_bytes(&serializer, &bytes).unwrap(),
        Animal::Animal {
            name: "Rex".to_string()
        }
    );
}

#[test]
fn test_null_discriminator_reads_as_nominal() {
    let fixture = fixture();
    let convention = Arc::new(StandardDiscriminatorConvention::scalar(
        fixture.registry.clone(),
    ));
    let serializer = animal_serializer(&fixture, convention, TypeId::of::<AnimalClass>());

    let bytes = polybson::doc! { "_t" => Bson::Null, "Name" => "Rex" }
        .to_bytes()
        .unwrap();
    assert_eq!(
        from_bytes(&serializer, &bytes).unwrap(),
        Animal::Animal {
            name: "Rex".to_string()
        }
    );
}

#[test]
fn test_last_chain_element_selects_the_type() {
    let fixture = fixture();
    let convention = Arc::new(StandardDiscriminatorConvention::hierarchical(
        fixture.registry.clone(),
    ));
    let serializer = animal_serializer(&fixture, convention, TypeId::of::<AnimalClass>());

    let chain = vec![
        Bson::String("Animal".to_string()),
        Bson::String("Cat".to_string()),
        Bson::String("Tiger".to_string()),
    ];
    let bytes = polybson::doc! {
        "_t" => chain,
        "_id" => 1,
        "Name" => "Shere Khan",
        "Age" => 11,
    }
    .to_bytes()
    .unwrap();
    assert_eq!(from_bytes(&serializer, &bytes).unwrap(), tiger());
}

#[test]
fn test_unknown_discriminator() {
    let fixture = fixture();
    let convention = Arc::new(StandardDiscriminatorConvention::scalar(
        fixture.registry.clone(),
    ));
    let serializer = animal_serializer(&fixture, convention, TypeId::of::<AnimalClass>());

    let bytes = polybson::doc! { "_t" => "Dodo" }.to_bytes().unwrap();
    match from_bytes(&serializer, &bytes) {
        Err(Error::UnknownDiscriminator(name)) => assert_eq!(name, "Dodo"),
        other => panic!("expected UnknownDiscriminator, got {other:?}"),
    }
}

#[test]
fn test_unknown_elements_are_tolerated() {
    let fixture = fixture();
    let convention = Arc::new(StandardDiscriminatorConvention::scalar(
        fixture.registry.clone(),
    ));
    let serializer = animal_serializer(&fixture, convention, TypeId::of::<AnimalClass>());

    let bytes = polybson::doc! {
        "_t" => "Bear",
        "Color" => "brown",
        "Name" => "Baloo",
    }
    .to_bytes()
    .unwrap();
    assert_eq!(
        from_bytes(&serializer, &bytes).unwrap(),
        Animal::Bear {
            name: "Baloo".to_string()
        }
    );
}

#[test]
fn test_nullable_polymorphic_slot() {
    let fixture = fixture();
    let convention = Arc::new(StandardDiscriminatorConvention::scalar(
        fixture.registry.clone(),
    ));
    let serializer = OptionSerializer::new(animal_serializer(
        &fixture,
        convention,
        TypeId::of::<AnimalClass>(),
    ));

    let mut writer = VecWriter::new();
    writer.write_start_document().unwrap();
    writer.write_name("pet").unwrap();
    serializer.serialize(&mut writer, &None).unwrap();
    writer.write_name("other").unwrap();
    serializer
        .serialize(&mut writer, &Some(tiger()))
        .unwrap();
    writer.write_end_document().unwrap();
    let bytes = writer.into_bytes();

    let mut reader = SliceReader::new(&bytes);
    reader.read_start_document().unwrap();
    assert_eq!(reader.read_name().unwrap(), "pet");
    assert_eq!(serializer.deserialize(&mut reader).unwrap(), None);
    assert_eq!(reader.read_name().unwrap(), "other");
    assert_eq!(
        serializer.deserialize(&mut reader).unwrap(),
        Some(tiger())
    );
    reader.read_end_document().unwrap();
}

#[test]
fn test_interface_convention_resolves_single_implementor() {
    let fixture = fixture();
    let convention = Arc::new(InterfaceDiscriminatorConvention::new(
        fixture.registry.clone(),
    ));
    let serializer = animal_serializer(&fixture, convention, TypeId::of::<dyn Pet>());

    let bytes = to_bytes(&serializer, &tiger());
    let document = Document::from_bytes(&bytes).unwrap();
    assert_eq!(document.get_str("_t"), Some("Tiger"));
    assert_eq!(from_bytes(&serializer, &bytes).unwrap(), tiger());
}

#[test]
fn test_interface_convention_requires_discriminator() {
    let fixture = fixture();
    let convention = Arc::new(InterfaceDiscriminatorConvention::new(
        fixture.registry.clone(),
    ));
    let serializer = animal_serializer(&fixture, convention, TypeId::of::<dyn Pet>());

    let bytes = polybson::doc! { "Name" => "Rex" }.to_bytes().unwrap();
    assert!(matches!(
        from_bytes(&serializer, &bytes),
        Err(Error::MissingField(_))
    ));
}

#[test]
fn test_interface_convention_rejects_ambiguity() {
    struct TwinA;
    struct TwinB;

    let fixture = fixture();
    fixture
        .registry
        .register(ClassMap::builder::<TwinA>("Twin").implements::<dyn Pet>())
        .unwrap();
    fixture
        .registry
        .register(ClassMap::builder::<TwinB>("Twin").implements::<dyn Pet>())
        .unwrap();

    let convention = Arc::new(InterfaceDiscriminatorConvention::new(
        fixture.registry.clone(),
    ));
    let serializer = animal_serializer(&fixture, convention, TypeId::of::<dyn Pet>());

    let bytes = polybson::doc! { "_t" => "Twin" }.to_bytes().unwrap();
    match from_bytes(&serializer, &bytes) {
        Err(Error::AmbiguousDiscriminator(name, count)) => {
            assert_eq!(name, "Twin");
            assert_eq!(count, 2);
        }
        other => panic!("expected AmbiguousDiscriminator, got {other:?}"),
    }
}

#[test]
fn test_duplicate_class_registration_is_rejected() {
    let fixture = fixture();
    assert!(matches!(
        fixture
            .registry
            .register(ClassMap::builder::<TigerClass>("Tiger2")),
        Err(Error::AlreadyRegistered(_))
    ));
}

#[test]
fn test_unknown_parent_is_rejected() {
    struct Orphan;
    let registry = HierarchyRegistry::new();
    assert!(matches!(
        registry.register(ClassMap::builder::<Orphan>("Orphan").parent("Nobody")),
        Err(Error::UnknownDiscriminator(_))
    ));
}
