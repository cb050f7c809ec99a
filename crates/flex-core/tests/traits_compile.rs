use flex_core::errors::{ErrorInfo, FlexError};
use flex_core::{Data, DataLoader, DataPreprocessor, Learner, Model, RawData, Scores};

#[derive(Default)]
struct DummyLoader;

impl DataLoader for DummyLoader {
    type X = String;
    type Y = f64;

    fn load_data(&mut self) -> Result<RawData<String, f64>, FlexError> {
        RawData::new(
            vec!["1.5".into(), "2.5".into(), "4.0".into()],
            vec![3.0, 5.0, 8.0],
        )
    }
}

#[derive(Default)]
struct DummyPreprocessor;

impl DataPreprocessor<String, f64> for DummyPreprocessor {
    type Output = f64;

    fn preprocess_data(&self, data: RawData<String, f64>) -> Result<Data<f64, f64>, FlexError> {
        let (x, y) = data.into_parts();
        let parsed = x
            .iter()
            .map(|raw| {
                raw.parse::<f64>().map_err(|err| {
                    FlexError::Serde(ErrorInfo::new("parse-sample", err.to_string()))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Data::new(parsed, y)
    }
}

#[derive(Default)]
struct DummyModel {
    slope: Option<f64>,
}

impl Model for DummyModel {
    type Input = f64;
    type Target = f64;
    type Prediction = f64;

    fn build(&mut self) -> Result<(), FlexError> {
        self.slope = Some(0.0);
        Ok(())
    }

    fn load(&mut self) -> Result<(), FlexError> {
        Err(FlexError::Io(ErrorInfo::new(
            "model-missing",
            "no stored weights",
        )))
    }

    fn save(&self) -> Result<(), FlexError> {
        Ok(())
    }

    fn predict(&self, data: &Data<f64, f64>) -> Result<Vec<f64>, FlexError> {
        let slope = self
            .slope
            .ok_or_else(|| FlexError::empty("model-unbuilt", "model weights"))?;
        Ok(data.x().iter().map(|x| x * slope).collect())
    }
}

#[derive(Default)]
struct DummyLearner;

impl Learner<DummyModel> for DummyLearner {
    fn train(&mut self, model: &mut DummyModel, train_data: &Data<f64, f64>) -> Result<(), FlexError> {
        let num: f64 = train_data.x().iter().zip(train_data.y()).map(|(x, y)| x * y).sum();
        let den: f64 = train_data.x().iter().map(|x| x * x).sum();
        model.slope = Some(num / den);
        Ok(())
    }

    fn test(&self, model: &DummyModel, test_data: &Data<f64, f64>) -> Result<Scores, FlexError> {
        let predictions = model.predict(test_data)?;
        let mse = predictions
            .iter()
            .zip(test_data.y())
            .map(|(p, y)| (p - y).powi(2))
            .sum::<f64>()
            / predictions.len() as f64;
        Ok([("mse".to_string(), mse)].into_iter().collect())
    }
}

#[test]
fn capability_interfaces_compose() {
    let mut loader = DummyLoader;
    let raw = loader.load_data().expect("load");
    assert_eq!(raw.len(), 3);

    let data = DummyPreprocessor.preprocess_data(raw).expect("preprocess");
    let mut model = DummyModel::default();
    assert!(model.load().is_err());
    model.build().expect("build");

    let mut learner = DummyLearner;
    learner.train(&mut model, &data).expect("train");
    let scores = learner.test(&model, &data).expect("test");
    assert!(scores["mse"] < 1.0);
    model.save().expect("save");
}

#[test]
fn misaligned_payloads_are_rejected() {
    let err = RawData::new(vec![1, 2, 3], vec![1]).unwrap_err();
    assert!(matches!(err, FlexError::Shape(_)));
    assert_eq!(err.info().code, "raw-data-misaligned");

    let err = Data::<f64>::new(vec![], vec![1.0]).unwrap_err();
    assert_eq!(err.info().code, "data-misaligned");
}

#[test]
fn predict_before_build_is_empty_document() {
    let model = DummyModel::default();
    let data = Data::new(vec![1.0], vec![2.0]).expect("data");
    assert!(matches!(
        model.predict(&data),
        Err(FlexError::EmptyDocument(_))
    ));
}
